use fieldpath::{type_name, Element, PathBuf};
use serde::Deserialize;
use serde_json::{Number, Value};
use serde_yaml_with_quirks::{DeserializingQuirks, Deserializer, Value as YamlValue};

use super::{RawObject, Resource};
use crate::{error::DecodeError, Error, Result};

fn documents(data: &[u8]) -> std::result::Result<Deserializer<'_>, DecodeError> {
	let text = std::str::from_utf8(data)?;
	Ok(Deserializer::from_str_with_quirks(
		text,
		DeserializingQuirks { old_octals: true },
	))
}

fn yaml_type_name(value: &YamlValue) -> &'static str {
	match value {
		YamlValue::Null => "null",
		YamlValue::Bool(_) => "boolean",
		YamlValue::Number(_) => "number",
		YamlValue::String(_) => "string",
		YamlValue::Sequence(_) => "sequence",
		YamlValue::Mapping(_) => "mapping",
	}
}

/// Scalar keys are stringified, numbers JSON can't hold (`.inf`, `.nan`) are rejected
fn to_json(value: YamlValue, at: &mut PathBuf) -> std::result::Result<Value, DecodeError> {
	Ok(match value {
		YamlValue::Null => Value::Null,
		YamlValue::Bool(b) => Value::Bool(b),
		YamlValue::Number(n) => {
			if let Some(u) = n.as_u64() {
				Value::from(u)
			} else if let Some(i) = n.as_i64() {
				Value::from(i)
			} else {
				n.as_f64()
					.and_then(Number::from_f64)
					.map(Value::Number)
					.ok_or_else(|| DecodeError::NonFiniteNumber(at.clone()))?
			}
		}
		YamlValue::String(s) => Value::String(s),
		YamlValue::Sequence(items) => {
			let mut out = Vec::with_capacity(items.len());
			for (idx, item) in items.into_iter().enumerate() {
				at.push(Element::Index(idx));
				out.push(to_json(item, at)?);
				at.pop();
			}
			Value::Array(out)
		}
		YamlValue::Mapping(mapping) => {
			let mut out = RawObject::new();
			for (key, item) in mapping {
				let key = match key {
					YamlValue::String(s) => s,
					YamlValue::Number(n) => n.to_string(),
					YamlValue::Bool(b) => b.to_string(),
					other => {
						return Err(DecodeError::UnsupportedKey(
							at.clone(),
							yaml_type_name(&other),
						))
					}
				};
				at.push(Element::Field(key.clone()));
				let item = to_json(item, at)?;
				at.pop();
				out.insert(key, item);
			}
			Value::Object(out)
		}
	})
}

/// Null and empty mapping documents are treated as absent
fn decode_document(document: Deserializer<'_>) -> std::result::Result<Option<RawObject>, DecodeError> {
	let value = YamlValue::deserialize(document)?;
	match to_json(value, &mut PathBuf::default())? {
		Value::Null => Ok(None),
		Value::Object(obj) if obj.is_empty() => Ok(None),
		Value::Object(obj) => Ok(Some(obj)),
		other => Err(DecodeError::NotAMapping(type_name(&other))),
	}
}

/// Decodes first document of the stream
pub(super) fn decode_first(data: &[u8]) -> Result<Option<RawObject>> {
	match documents(data)?.next() {
		Some(document) => Ok(decode_document(document)?),
		None => Ok(None),
	}
}

/// Expands list wrapper into its items, or wraps single object.
///
/// Anything with `items` sequence is a list, as is `*List` kind with `items` of any type
fn expand(mut obj: RawObject) -> Result<Vec<Resource>> {
	let kind = obj
		.get("kind")
		.and_then(Value::as_str)
		.unwrap_or("")
		.to_owned();
	let is_list = match obj.get("items") {
		None => false,
		Some(Value::Array(_)) => true,
		Some(_) => kind.ends_with("List"),
	};
	if !is_list {
		return Ok(vec![Resource::from_raw(obj)]);
	}

	let items = match obj.remove("items") {
		Some(Value::Array(items)) => items,
		Some(Value::Null) | None => vec![],
		Some(other) => {
			return Err(Error::MalformedCollection {
				kind,
				reason: format!("items should be a sequence, found {}", type_name(&other)),
			})
		}
	};
	log::trace!("expanding {} with {} items", kind, items.len());

	items
		.into_iter()
		.enumerate()
		.map(|(idx, item)| match item {
			Value::Object(item) => Ok(Resource::from_raw(item)),
			other => Err(Error::MalformedCollection {
				kind: kind.clone(),
				reason: format!("item {} should be a mapping, found {}", idx, type_name(&other)),
			}),
		})
		.collect()
}

/// Parses single resource or list of resources.
/// Empty input produces no resources
pub fn parse_collection(data: &[u8]) -> Result<Vec<Resource>> {
	match decode_first(data)? {
		Some(obj) => expand(obj),
		None => {
			log::debug!("empty document");
			Ok(vec![])
		}
	}
}

/// Same as `parse_collection`, but for every document in `---` separated stream
pub fn parse_stream(data: &[u8]) -> Result<Vec<Resource>> {
	let mut out = vec![];
	for (idx, document) in documents(data)?.enumerate() {
		match decode_document(document)? {
			Some(obj) => out.extend(expand(obj)?),
			None => log::debug!("skipping empty document {}", idx),
		}
	}
	Ok(out)
}
