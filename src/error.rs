use thiserror::Error;

use crate::kubemodel::ObjectKind;

/// Input could not be read as a structured document
#[derive(Error, Debug)]
pub enum DecodeError {
	#[error("input is not valid utf-8: {0}")]
	Utf8(#[from] std::str::Utf8Error),
	#[error(transparent)]
	Yaml(#[from] serde_yaml_with_quirks::Error),
	#[error("expected a mapping at the top level, found {0}")]
	NotAMapping(&'static str),
	#[error("at {0}: number is not finite")]
	NonFiniteNumber(fieldpath::PathBuf),
	#[error("at {0}: {1} can't be used as mapping key")]
	UnsupportedKey(fieldpath::PathBuf, &'static str),
}

/// Why typed conversion failed
#[derive(Error, Debug)]
pub enum ConversionFailure {
	#[error("no type registered")]
	NotRegistered,
	#[error("registered type is {registered}, requested {requested}")]
	TypeMismatch {
		registered: &'static str,
		requested: &'static str,
	},
	#[error("{0}")]
	Deserialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
	#[error("failed to decode document: {0}")]
	Decode(#[from] DecodeError),
	#[error("malformed {kind} collection: {reason}")]
	MalformedCollection { kind: String, reason: String },
	#[error("failed to convert {kind}: {reason}")]
	Conversion {
		kind: ObjectKind,
		reason: ConversionFailure,
	},
	#[error("failed to encode document: {0}")]
	Encode(#[source] serde_json::Error),
	/// apiVersion has more than one group separator.
	/// This is a defect of the document producer, never recovered from internally
	#[error("expected apiVersion of format group/version, got {0:?}")]
	MalformedApiVersion(String),
	#[error("path error: {0}")]
	Path(#[from] fieldpath::Error),
}
pub type Result<T> = std::result::Result<T, Error>;
