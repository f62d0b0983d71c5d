//! Registry of statically-typed shapes, used by `Resource::as_typed`

use std::any::{type_name, Any, TypeId};

use k8s_openapi::api::{
	apps::v1 as apps_v1, batch::v1 as batch_v1, core::v1 as core_v1, rbac::v1 as rbac_v1,
};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::ConversionFailure, kubemodel::ObjectKind, Error, Result};

type Converter = fn(Value) -> std::result::Result<Box<dyn Any>, serde_json::Error>;

fn convert_to<T: DeserializeOwned + 'static>(
	value: Value,
) -> std::result::Result<Box<dyn Any>, serde_json::Error> {
	Ok(Box::new(serde_json::from_value::<T>(value)?))
}

struct Registration {
	type_id: TypeId,
	type_name: &'static str,
	convert: Converter,
}

/// Maps object kinds to rust types they can be converted to
#[derive(Default)]
pub struct Scheme {
	types: FxHashMap<ObjectKind, Registration>,
}

impl Scheme {
	pub fn new() -> Self {
		Self::default()
	}

	/// Scheme with commonly used core, apps, batch and rbac types
	pub fn with_builtins() -> Self {
		let mut scheme = Self::new();
		scheme
			.register::<core_v1::ConfigMap>()
			.register::<core_v1::Secret>()
			.register::<core_v1::Service>()
			.register::<core_v1::ServiceAccount>()
			.register::<core_v1::Namespace>()
			.register::<core_v1::Pod>()
			.register::<core_v1::PersistentVolumeClaim>()
			.register::<apps_v1::Deployment>()
			.register::<apps_v1::StatefulSet>()
			.register::<apps_v1::DaemonSet>()
			.register::<batch_v1::Job>()
			.register::<batch_v1::CronJob>()
			.register::<rbac_v1::Role>()
			.register::<rbac_v1::RoleBinding>()
			.register::<rbac_v1::ClusterRole>()
			.register::<rbac_v1::ClusterRoleBinding>();
		scheme
	}

	/// Register k8s-openapi type under its own apiVersion and kind
	pub fn register<T>(&mut self) -> &mut Self
	where
		T: k8s_openapi::Resource + DeserializeOwned + 'static,
	{
		self.register_as::<T>(T::API_VERSION, T::KIND)
	}

	/// Register arbitrary type, i.e for custom resources.
	/// Replaces previous registration for the same kind
	pub fn register_as<T>(&mut self, api_version: impl Into<String>, kind: impl Into<String>) -> &mut Self
	where
		T: DeserializeOwned + 'static,
	{
		let kind = ObjectKind::new(api_version, kind);
		log::trace!("registering {} as {}", kind, type_name::<T>());
		self.types.insert(
			kind,
			Registration {
				type_id: TypeId::of::<T>(),
				type_name: type_name::<T>(),
				convert: convert_to::<T>,
			},
		);
		self
	}

	pub fn is_registered(&self, kind: &ObjectKind) -> bool {
		self.types.contains_key(kind)
	}

	pub fn convert<T: 'static>(&self, kind: &ObjectKind, value: Value) -> Result<T> {
		let failed = |reason| Error::Conversion {
			kind: kind.clone(),
			reason,
		};
		let registration = self
			.types
			.get(kind)
			.ok_or_else(|| failed(ConversionFailure::NotRegistered))?;
		if registration.type_id != TypeId::of::<T>() {
			return Err(failed(ConversionFailure::TypeMismatch {
				registered: registration.type_name,
				requested: type_name::<T>(),
			}));
		}
		let converted = (registration.convert)(value)
			.map_err(|e| failed(ConversionFailure::Deserialize(e)))?;
		converted.downcast::<T>().map(|v| *v).map_err(|_| {
			failed(ConversionFailure::TypeMismatch {
				registered: registration.type_name,
				requested: type_name::<T>(),
			})
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;
	use serde_json::json;

	#[derive(Deserialize, Debug, PartialEq)]
	struct Widget {
		spec: WidgetSpec,
	}
	#[derive(Deserialize, Debug, PartialEq)]
	struct WidgetSpec {
		size: u32,
	}

	#[test]
	fn builtin_conversion() {
		let scheme = Scheme::with_builtins();
		let cm: core_v1::ConfigMap = scheme
			.convert(
				&ObjectKind::new("v1", "ConfigMap"),
				json!({
					"apiVersion": "v1",
					"kind": "ConfigMap",
					"metadata": {"name": "settings"},
					"data": {"a": "b"},
				}),
			)
			.unwrap();
		assert_eq!(cm.metadata.name.as_deref(), Some("settings"));
		assert_eq!(cm.data.unwrap()["a"], "b");
	}

	#[test]
	fn custom_registration() {
		let mut scheme = Scheme::new();
		scheme.register_as::<Widget>("example.com/v1", "Widget");
		let kind = ObjectKind::new("example.com/v1", "Widget");
		assert!(scheme.is_registered(&kind));

		let widget: Widget = scheme
			.convert(&kind, json!({"spec": {"size": 3}}))
			.unwrap();
		assert_eq!(widget.spec.size, 3);

		let err = scheme
			.convert::<Widget>(&kind, json!({"spec": {"size": "big"}}))
			.unwrap_err();
		assert!(matches!(
			err,
			Error::Conversion {
				reason: ConversionFailure::Deserialize(_),
				..
			}
		));
	}

	#[test]
	fn unknown_and_mismatched() {
		let scheme = Scheme::with_builtins();
		let err = scheme
			.convert::<Widget>(&ObjectKind::new("example.com/v1", "Widget"), json!({}))
			.unwrap_err();
		assert!(matches!(
			err,
			Error::Conversion {
				reason: ConversionFailure::NotRegistered,
				..
			}
		));

		let err = scheme
			.convert::<core_v1::Secret>(&ObjectKind::new("v1", "ConfigMap"), json!({}))
			.unwrap_err();
		assert!(matches!(
			err,
			Error::Conversion {
				reason: ConversionFailure::TypeMismatch { .. },
				..
			}
		));
	}
}
