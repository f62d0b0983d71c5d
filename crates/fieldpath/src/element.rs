use std::fmt::{self, Display};

/// Single step of a path into a document tree
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Element {
    /// Mapping key, owned
    Field(String),
    /// Mapping key, known at compile time (see `path!`)
    StaticField(&'static str),
    /// Sequence position
    Index(usize),
}

impl Element {
    /// Key name, if this element addresses a mapping
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field(field) => Some(field),
            Self::StaticField(field) => Some(field),
            Self::Index(_) => None,
        }
    }
}

fn needs_quoting(n: &str) -> bool {
    n.is_empty() || n.contains(|c| matches!(c, '"' | '.' | '[' | '\n'))
}

fn write_field(f: &mut fmt::Formatter<'_>, n: &str) -> fmt::Result {
    if needs_quoting(n) {
        write!(f, ".\"{}\"", n.replace('"', "\\\""))
    } else {
        write!(f, ".{}", n)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticField(field) => write_field(f, field),
            Self::Field(field) => write_field(f, field),
            Self::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}
