use std::fmt::{self, Display};

use crate::{Error, Result};

/// Splits apiVersion into its group, empty string is the core group
pub(crate) fn api_group(api_version: &str) -> Result<&str> {
	match api_version.split_once('/') {
		None => Ok(""),
		Some((group, version)) if !version.contains('/') => Ok(group),
		Some(_) => Err(Error::MalformedApiVersion(api_version.to_owned())),
	}
}

/// Identifies object type, as written in document
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ObjectKind {
	// apps/v1
	pub api_version: String,
	// Deployment
	pub kind: String,
}

impl ObjectKind {
	pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			api_version: api_version.into(),
			kind: kind.into(),
		}
	}

	pub fn group(&self) -> Result<&str> {
		api_group(&self.api_version)
	}

	pub fn version(&self) -> Result<&str> {
		let group = self.group()?;
		Ok(if group.is_empty() {
			&self.api_version
		} else {
			&self.api_version[group.len() + 1..]
		})
	}
}

impl Display for ObjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.api_version, self.kind)
	}
}

/// Identifies object in cluster
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ObjectId {
	pub kind: ObjectKind,

	pub name: String,
	pub namespace: Option<String>,
}

impl Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.kind, self.name)?;
		if let Some(ns) = &self.namespace {
			write!(f, " in {}", ns)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn group_split() {
		assert_eq!(api_group("v1").unwrap(), "");
		assert_eq!(api_group("apps/v1").unwrap(), "apps");
		assert_eq!(api_group("").unwrap(), "");
		assert!(matches!(
			api_group("a/b/v1"),
			Err(Error::MalformedApiVersion(v)) if v == "a/b/v1"
		));
	}

	#[test]
	fn version_split() {
		assert_eq!(ObjectKind::new("v1", "Pod").version().unwrap(), "v1");
		assert_eq!(
			ObjectKind::new("rbac.authorization.k8s.io/v1", "Role")
				.version()
				.unwrap(),
			"v1"
		);
	}

	#[test]
	fn display() {
		let id = ObjectId {
			kind: ObjectKind::new("apps/v1", "Deployment"),
			name: "web".to_owned(),
			namespace: Some("prod".to_owned()),
		};
		assert_eq!(id.to_string(), "apps/v1 Deployment web in prod");
	}
}
