use crate::{Element, ParseError};
use std::{
    fmt::{self, Display},
    ops::Deref,
    str::FromStr,
};

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PathBuf(pub Vec<Element>);
pub type Path = [Element];

impl From<&Path> for PathBuf {
    fn from(p: &Path) -> Self {
        PathBuf(p.into())
    }
}

impl PathBuf {
    pub fn push(&mut self, element: Element) {
        self.0.push(element)
    }

    pub fn pop(&mut self) -> Option<Element> {
        self.0.pop()
    }
}

impl Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for part in self.0.iter() {
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}
impl Deref for PathBuf {
    type Target = [Element];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for PathBuf {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        crate::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::PathBuf;
    use crate::Element;

    #[test]
    fn push_pop() {
        let mut path = PathBuf::default();
        assert_eq!(path.to_string(), ".");
        path.push(Element::Field("spec".to_owned()));
        path.push(Element::Index(2));
        assert_eq!(path.to_string(), ".spec[2]");
        assert_eq!(path.pop(), Some(Element::Index(2)));
        assert_eq!(path.to_string(), ".spec");
    }
}
