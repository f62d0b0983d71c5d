//! Addressing of nested fields inside schema-free `serde_json::Value` trees

mod error;
pub use error::*;
mod element;
pub use element::Element;
mod ext;
mod path;
pub use ext::{type_name, FieldpathExt};
pub use path::{Path, PathBuf};
mod parse;
pub use parse::{parse, ParseError};

/// Construct &Path without parsing
#[macro_export]
macro_rules! path {
    ($(.$text:literal)+) => {
        &[$($crate::Element::StaticField($text)),+][..] as &$crate::Path
    };
}
