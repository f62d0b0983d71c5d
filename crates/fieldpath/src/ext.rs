use crate::{Element, Error, Path, Result};
use duplicate::duplicate_item;
use serde_json::{Map, Value};

/// Short name of value variant, for error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

pub trait FieldpathExt: Sized {
    fn get_comp(&self, comp: &Element) -> Result<&Self>;
    fn get_path(&self, path: &Path) -> Result<&Self>;

    fn get_comp_mut(&mut self, comp: &Element) -> Result<&mut Self>;
    fn get_path_mut(&mut self, path: &Path) -> Result<&mut Self>;

    fn remove_comp(&mut self, comp: &Element) -> Result<Option<Self>>;
    /// Removes value at path, returning it. Missing last field is not an error
    fn remove_path(&mut self, path: &Path) -> Result<Option<Self>>;

    fn set_comp(&mut self, comp: &Element, value: Self) -> Result<Option<Self>>;
    /// Sets value at path, creating missing (or null) intermediate mappings
    fn set_path(&mut self, path: &Path, value: Self) -> Result<Option<Self>>;

    fn has_path(&self, path: &Path) -> bool;

    fn get_str(&self, path: &Path) -> Option<&str>;
    fn get_object(&self, path: &Path) -> Option<&Map<String, Value>>;
}
impl FieldpathExt for Value {
    #[duplicate_item(
        this_method method reference(type) ret_type;
        [get_comp] [get] [&type] [&Self];
        [get_comp_mut] [get_mut] [&mut type] [&mut Self]
    )]
    fn this_method(self: reference([Self]), comp: &Element) -> Result<ret_type> {
        match (comp, self) {
            (Element::Index(idx), Value::Array(items)) => {
                items.method(*idx).ok_or(Error::OutOfBounds)
            }
            (Element::Index(_), other) => Err(Error::NotAnArray(type_name(other))),
            (Element::Field(field), Value::Object(obj)) => {
                obj.method(field.as_str()).ok_or(Error::FieldNotFound)
            }
            (Element::StaticField(field), Value::Object(obj)) => {
                obj.method(*field).ok_or(Error::FieldNotFound)
            }
            (_, other) => Err(Error::NotAnObject(type_name(other))),
        }
    }

    #[duplicate_item(
        this_method method reference(type) ret_type;
        [get_path] [get_comp] [&type] [&Self];
        [get_path_mut] [get_comp_mut] [&mut type] [&mut Self]
    )]
    fn this_method(self: reference([Self]), path: &Path) -> Result<ret_type> {
        let mut found = self;
        for (idx, elem) in path.iter().enumerate() {
            found = found
                .method(elem)
                .map_err(|e| Error::AtPath((&path[0..idx]).into(), Box::new(e)))?;
        }
        Ok(found)
    }

    fn remove_comp(&mut self, comp: &Element) -> Result<Option<Self>> {
        match (comp, self) {
            (Element::Index(idx), Value::Array(items)) => {
                if *idx < items.len() {
                    Ok(Some(items.remove(*idx)))
                } else {
                    Err(Error::OutOfBounds)
                }
            }
            (Element::Index(_), other) => Err(Error::NotAnArray(type_name(other))),
            (_, Value::Object(obj)) => Ok(comp.field_name().and_then(|field| obj.remove(field))),
            (_, other) => Err(Error::NotAnObject(type_name(other))),
        }
    }
    fn remove_path(&mut self, path: &Path) -> Result<Option<Self>> {
        let (el, path) = path.split_last().ok_or(Error::EmptyPath)?;
        let this = self.get_path_mut(path)?;
        this.remove_comp(el)
            .map_err(|e| Error::AtPath(path.into(), Box::new(e)))
    }

    fn set_comp(&mut self, comp: &Element, target: Self) -> Result<Option<Self>> {
        match (comp, self) {
            (Element::Index(idx), Value::Array(items)) => match items.get_mut(*idx) {
                Some(item) => Ok(Some(std::mem::replace(item, target))),
                None => Err(Error::OutOfBounds),
            },
            (Element::Index(_), other) => Err(Error::NotAnArray(type_name(other))),
            (Element::Field(field), Value::Object(obj)) => Ok(obj.insert(field.to_owned(), target)),
            (Element::StaticField(field), Value::Object(obj)) => {
                Ok(obj.insert((*field).to_owned(), target))
            }
            (_, other) => Err(Error::NotAnObject(type_name(other))),
        }
    }
    fn set_path(&mut self, path: &Path, target: Self) -> Result<Option<Self>> {
        let (el, parent) = path.split_last().ok_or(Error::EmptyPath)?;
        let mut this = self;
        for (idx, elem) in parent.iter().enumerate() {
            if this.is_null() {
                *this = Value::Object(Map::new());
            }
            if let (Some(field), Value::Object(obj)) = (elem.field_name(), &mut *this) {
                if !obj.contains_key(field) {
                    obj.insert(field.to_owned(), Value::Object(Map::new()));
                }
            }
            this = this
                .get_comp_mut(elem)
                .map_err(|e| Error::AtPath((&parent[0..idx]).into(), Box::new(e)))?;
        }
        if this.is_null() {
            *this = Value::Object(Map::new());
        }
        this.set_comp(el, target)
            .map_err(|e| Error::AtPath(parent.into(), Box::new(e)))
    }

    fn has_path(&self, path: &Path) -> bool {
        self.get_path(path).is_ok()
    }

    fn get_str(&self, path: &Path) -> Option<&str> {
        self.get_path(path).ok()?.as_str()
    }
    fn get_object(&self, path: &Path) -> Option<&Map<String, Value>> {
        self.get_path(path).ok()?.as_object()
    }
}

#[cfg(test)]
mod tests {
    use super::FieldpathExt;
    use crate::{path, Error, PathBuf};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn remove() {
        let mut obj = json!({
            "metadata": {"name": "a", "namespace": "b"},
        });
        let removed = obj.remove_path(path!(."metadata"."namespace")).unwrap();
        assert_eq!(removed, Some(json!("b")));
        assert_eq!(obj, json!({"metadata": {"name": "a"}}));

        // Already gone
        assert_eq!(obj.remove_path(path!(."metadata"."namespace")).unwrap(), None);
        // Parent gone
        assert!(obj.remove_path(path!(."spec"."replicas")).is_err());
    }

    #[test]
    fn set_creates_parents() {
        let mut obj = json!({"kind": "ConfigMap", "metadata": null});
        obj.set_path(path!(."metadata"."labels"."app"), json!("web"))
            .unwrap();
        assert_eq!(
            obj,
            json!({"kind": "ConfigMap", "metadata": {"labels": {"app": "web"}}})
        );
    }

    #[test]
    fn set_through_scalar_fails() {
        let mut obj = json!({"metadata": "oops"});
        let err = obj
            .set_path(path!(."metadata"."name"), json!("x"))
            .unwrap_err();
        assert!(matches!(err, Error::AtPath(_, inner) if matches!(*inner, Error::NotAnObject("string"))));
    }

    #[test]
    fn indexed_lookup() {
        let obj = json!({"items": [{"kind": "Pod"}, {"kind": "Service"}]});
        let path = PathBuf::from_str(".items[1].kind").unwrap();
        assert_eq!(obj.get_str(&path), Some("Service"));
        assert!(!obj.has_path(&PathBuf::from_str(".items[2]").unwrap()));
        assert!(obj.get_object(path!(."items")).is_none());
    }
}
