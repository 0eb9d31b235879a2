//! Bind targets
//!
//! The binder only needs string-keyed get/set on the target. `Record` is
//! the map-backed implementation used by the CLI and tests; any
//! `serde_json::Map` works as a target too.

use serde_json::{Map, Value};

use crate::error::FormError;

/// Attribute access on a bind target
pub trait Entity {
    fn get_attribute(&self, name: &str) -> Option<&Value>;
    fn set_attribute(&mut self, name: &str, value: Value);
}

impl Entity for Map<String, Value> {
    fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

/// Map-backed entity, attributes kept in assignment order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object
    pub fn from_value(value: Value) -> Result<Self, FormError> {
        match value {
            Value::Object(attributes) => Ok(Self { attributes }),
            other => Err(FormError::InvalidData {
                what: "entity".into(),
                found: type_name(&other).into(),
            }),
        }
    }

    /// Check if an attribute is set (present and not null)
    pub fn is_set(&self, name: &str) -> bool {
        matches!(self.attributes.get(name), Some(v) if !v.is_null())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Serialize to a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}

impl Entity for Record {
    fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }
}

/// JSON type name for error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get() {
        let mut record = Record::new();
        record.set("integer", 314);

        assert_eq!(record.get("integer"), Some(&json!(314)));
        assert!(record.is_set("integer"));
        assert!(!record.is_set("not_in_form"));
    }

    #[test]
    fn null_is_not_set() {
        let mut record = Record::new();
        record.set("x", Value::Null);
        assert!(!record.is_set("x"));
    }

    #[test]
    fn from_value_requires_object() {
        assert!(Record::from_value(json!({"a": 1})).is_ok());
        let err = Record::from_value(json!([1])).unwrap_err();
        assert!(err.to_string().contains("FORM-020"));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn map_is_an_entity() {
        let mut map = Map::new();
        map.set_attribute("a", json!(1));
        assert_eq!(map.get_attribute("a"), Some(&json!(1)));
    }
}
