//! Typed access to schema-free cluster resource documents

mod error;
pub use error::*;
pub mod kubemodel;
mod resource;
pub use resource::{parse_collection, parse_stream, RawObject, Resource};
pub mod scheme;
pub use scheme::Scheme;

pub use fieldpath;
