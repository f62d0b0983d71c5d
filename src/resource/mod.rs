mod parse;

pub use parse::{parse_collection, parse_stream};

use std::{
	borrow::Cow,
	collections::BTreeMap,
	fmt::{self, Display},
};

use chrono::{DateTime, Utc};
use fieldpath::{path, type_name, Element, FieldpathExt, Path};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::core::GroupVersionResource;
use serde_json::{Map, Value};

use crate::{
	error::DecodeError,
	kubemodel::{self, ObjectId, ObjectKind},
	scheme::Scheme,
	Error, Result,
};

/// Untyped document tree, top level is always a mapping
pub type RawObject = Map<String, Value>;

/// Schema-free resource document with typed access to well-known fields.
///
/// Accessors never fail on absent or mistyped fields, falling back to empty values instead
#[derive(Clone, Debug)]
pub struct Resource {
	obj: RawObject,
	gvr: Option<GroupVersionResource>,
	transient: bool,
}

impl Resource {
	/// Wraps already decoded document of known resource type
	pub fn from_typed(obj: RawObject, gvr: GroupVersionResource) -> Self {
		Self {
			obj,
			gvr: Some(gvr),
			transient: false,
		}
	}

	/// Same as `from_typed`, but resource is marked as not yet existing in cluster
	pub fn provisional(obj: RawObject, gvr: GroupVersionResource) -> Self {
		let mut res = Self::from_typed(obj, gvr);
		res.mark_transient();
		res
	}

	pub(crate) fn from_raw(obj: RawObject) -> Self {
		Self {
			obj,
			gvr: None,
			transient: false,
		}
	}

	/// Decodes YAML (or JSON) document, `None` is returned for empty documents
	pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
		Ok(parse::decode_first(data)?.map(Self::from_raw))
	}

	/// Panics on invalid or empty input, only use with trusted data
	pub fn must_from_bytes(data: &[u8]) -> Self {
		match Self::from_bytes(data) {
			Ok(Some(res)) => res,
			Ok(None) => panic!("Empty resource"),
			Err(e) => panic!("Invalid resource: {}", e),
		}
	}

	pub fn group_version_resource(&self) -> Option<&GroupVersionResource> {
		self.gvr.as_ref()
	}

	/// Looks up arbitrary field
	pub fn get(&self, path: &Path) -> Option<&Value> {
		let (head, rest) = path.split_first()?;
		self.obj.get(head.field_name()?)?.get_path(rest).ok()
	}

	/// Same as `get`, but reports why lookup failed
	pub fn try_get(&self, path: &Path) -> Result<&Value> {
		let (head, rest) = path.split_first().ok_or(fieldpath::Error::EmptyPath)?;
		let root = match head.field_name() {
			Some(field) => self
				.obj
				.get(field)
				.ok_or_else(|| fieldpath::Error::AtPath(Default::default(), Box::new(fieldpath::Error::FieldNotFound)))?,
			None => return Err(fieldpath::Error::NotAnArray("mapping").into()),
		};
		root.get_path(rest).map_err(|e| {
			let mut at = fieldpath::PathBuf::from(&path[..1]);
			let inner = match e {
				fieldpath::Error::AtPath(rel, inner) => {
					at.0.extend(rel.0);
					inner
				}
				other => Box::new(other),
			};
			fieldpath::Error::AtPath(at, inner).into()
		})
	}

	fn get_str(&self, path: &Path) -> &str {
		self.get(path).and_then(Value::as_str).unwrap_or("")
	}

	fn get_string_map(&self, path: &Path) -> Option<BTreeMap<String, String>> {
		let map = self.get(path)?.as_object()?;
		let out: Option<BTreeMap<String, String>> = map
			.iter()
			.map(|(k, v)| Some((k.clone(), v.as_str()?.to_owned())))
			.collect();
		if out.is_none() {
			log::debug!("{}: non-string values at {}", self, fieldpath::PathBuf::from(path));
		}
		out
	}

	fn set_metadata_field(&mut self, field: &'static str, value: Value) {
		let metadata = self.obj.entry("metadata").or_insert(Value::Null);
		if !(metadata.is_object() || metadata.is_null()) {
			log::warn!("replacing metadata of type {}", type_name(metadata));
			*metadata = Value::Null;
		}
		// Null is replaced with a mapping, so this can't fail
		if let Err(e) = metadata.set_path(&[Element::StaticField(field)], value) {
			log::error!("failed to set metadata.{}: {}", field, e);
		}
	}

	pub fn kind(&self) -> &str {
		self.get_str(path!(."kind"))
	}
	pub fn api_version(&self) -> &str {
		self.get_str(path!(."apiVersion"))
	}

	/// API group, empty for the core group.
	/// Fails if apiVersion contains more than one `/`
	pub fn api_group(&self) -> Result<&str> {
		kubemodel::api_group(self.api_version())
	}

	pub fn object_kind(&self) -> ObjectKind {
		ObjectKind::new(self.api_version(), self.kind())
	}

	pub fn id(&self) -> ObjectId {
		let namespace = self.namespace();
		ObjectId {
			kind: self.object_kind(),
			name: self.name().into_owned(),
			namespace: (!namespace.is_empty()).then(|| namespace.to_owned()),
		}
	}

	pub fn namespace(&self) -> &str {
		self.get_str(path!(."metadata"."namespace"))
	}

	/// Empty namespace is still present, removed one is not
	pub fn has_namespace(&self) -> bool {
		matches!(
			self.get(path!(."metadata"."namespace")),
			Some(Value::String(_))
		)
	}

	pub fn set_namespace(&mut self, namespace: impl Into<String>) {
		self.set_metadata_field("namespace", Value::String(namespace.into()));
	}

	pub fn remove_namespace(&mut self) {
		if let Some(metadata) = self.obj.get_mut("metadata") {
			match metadata.remove_path(path!(."namespace")) {
				Ok(removed) => log::trace!("removed namespace {:?}", removed),
				// Non-mapping metadata holds no namespace
				Err(e) => log::debug!("no namespace to remove: {}", e),
			}
		}
	}

	/// Object name. Objects named by server have their `generateName` returned, suffixed with `*`
	pub fn name(&self) -> Cow<'_, str> {
		let name = self.get_str(path!(."metadata"."name"));
		if !name.is_empty() {
			return Cow::Borrowed(name);
		}
		let generate_name = self.get_str(path!(."metadata"."generateName"));
		if !generate_name.is_empty() {
			return Cow::Owned(format!("{}*", generate_name));
		}
		Cow::Borrowed("")
	}

	/// Doesn't touch `generateName`
	pub fn set_name(&mut self, name: impl Into<String>) {
		self.set_metadata_field("name", Value::String(name.into()));
	}

	pub fn description(&self) -> String {
		let mut out = format!(
			"{}/{} ({})",
			self.kind().to_lowercase(),
			self.name(),
			self.api_version()
		);
		let namespace = self.namespace();
		if !namespace.is_empty() {
			out.push_str(" namespace: ");
			out.push_str(namespace);
		} else {
			out.push_str(" cluster");
		}
		out
	}

	pub fn annotations(&self) -> Option<BTreeMap<String, String>> {
		self.get_string_map(path!(."metadata"."annotations"))
	}
	pub fn labels(&self) -> Option<BTreeMap<String, String>> {
		self.get_string_map(path!(."metadata"."labels"))
	}

	/// Entries which are not mappings are skipped, absent or mistyped fields are left empty
	pub fn owner_refs(&self) -> Vec<OwnerReference> {
		let refs = match self
			.get(path!(."metadata"."ownerReferences"))
			.and_then(Value::as_array)
		{
			Some(refs) => refs,
			None => return vec![],
		};
		refs.iter()
			.enumerate()
			.filter_map(|(idx, r)| match r {
				Value::Object(r) => Some(owner_ref(r)),
				other => {
					log::debug!(
						"{}: skipping owner reference {} of type {}",
						self,
						idx,
						type_name(other)
					);
					None
				}
			})
			.collect()
	}

	pub fn status(&self) -> Option<&RawObject> {
		self.obj.get("status")?.as_object()
	}

	/// `None` stands for zero timestamp, which is also returned for unparseable values
	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		let raw = self
			.get(path!(."metadata"."creationTimestamp"))?
			.as_str()?;
		match DateTime::parse_from_rfc3339(raw) {
			Ok(time) => Some(time.with_timezone(&Utc)),
			Err(e) => {
				log::debug!("{}: bad creationTimestamp {:?}: {}", self, raw, e);
				None
			}
		}
	}

	pub fn uid(&self) -> &str {
		self.get_str(path!(."metadata"."uid"))
	}

	pub fn is_provisioned(&self) -> bool {
		// Some server-side objects (i.e metrics.k8s.io PodMetrics) have no uid set
		!self.uid().is_empty() || self.created_at().is_some()
	}

	pub fn is_deleting(&self) -> bool {
		matches!(
			self.get(path!(."metadata"."deletionTimestamp")),
			Some(v) if !v.is_null()
		)
	}

	pub(crate) fn mark_transient(&mut self) {
		self.transient = true;
	}
	pub fn is_transient(&self) -> bool {
		self.transient
	}

	pub fn deep_copy(&self) -> Self {
		self.clone()
	}
	pub fn deep_copy_raw(&self) -> RawObject {
		self.obj.clone()
	}
	pub fn into_raw(self) -> RawObject {
		self.obj
	}

	/// Encodes document as JSON flavoured YAML. Every string is quoted,
	/// so nothing is reinterpreted (`"0o17"`, `"+.inf"`) when decoded back
	pub fn as_yaml_bytes(&self) -> Result<Vec<u8>> {
		serde_json::to_vec_pretty(&self.obj).map_err(Error::Encode)
	}

	/// Converts document to the type registered in scheme for its apiVersion and kind
	pub fn as_typed<T: 'static>(&self, scheme: &Scheme) -> Result<T> {
		scheme.convert(&self.object_kind(), Value::Object(self.obj.clone()))
	}
}

fn owner_ref(entry: &RawObject) -> OwnerReference {
	let string = |field: &str| {
		entry
			.get(field)
			.and_then(Value::as_str)
			.unwrap_or("")
			.to_owned()
	};
	let flag = |field: &str| entry.get(field).and_then(Value::as_bool);
	OwnerReference {
		api_version: string("apiVersion"),
		kind: string("kind"),
		name: string("name"),
		uid: string("uid"),
		controller: flag("controller"),
		block_owner_deletion: flag("blockOwnerDeletion"),
	}
}

/// Only document content is compared
impl PartialEq for Resource {
	fn eq(&self, other: &Self) -> bool {
		self.obj == other.obj
	}
}

impl Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.description())
	}
}

impl TryFrom<Value> for Resource {
	type Error = Error;

	fn try_from(value: Value) -> Result<Self> {
		match value {
			Value::Object(obj) => Ok(Self::from_raw(obj)),
			other => Err(DecodeError::NotAMapping(type_name(&other)).into()),
		}
	}
}
