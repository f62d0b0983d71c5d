use thiserror::Error;

use crate::PathBuf;

#[derive(Error, Debug)]
pub enum Error {
    #[error("field not found")]
    FieldNotFound,
    #[error("expected a mapping, found {0}")]
    NotAnObject(&'static str),
    #[error("expected a sequence, found {0}")]
    NotAnArray(&'static str),
    #[error("index out of bounds")]
    OutOfBounds,
    #[error("path is empty")]
    EmptyPath,
    #[error("at {0}: {1}")]
    AtPath(PathBuf, Box<Error>),
}
pub type Result<T> = std::result::Result<T, Error>;
