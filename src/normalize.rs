//! Submitted-value normalization
//!
//! Walks a submitted value tree before it is merged onto an entity:
//! - drops `null` leaves and empty containers
//! - keeps scalars, including `""`, `0` and `false`
//! - applies the filters of the element registered under the leaf's
//!   qualified name (`test[test1][en]`)
//! - under a repeatable group root, applies the filters of the base
//!   element named by the last segment, whatever the instance key
//!
//! Arrays are walked with their positions as keys, so the result is
//! always a keyed mapping that keeps the submitted indices.

use serde_json::{Map, Value};

use crate::form::Form;
use crate::path;

/// Value normalizer bound to one form's registry and filters
pub struct Normalizer<'a> {
    form: &'a Form,
}

impl<'a> Normalizer<'a> {
    pub fn new(form: &'a Form) -> Self {
        Self { form }
    }

    /// Normalize every entry of a container submitted under `path`
    ///
    /// Scalars have no entries and produce an empty mapping.
    pub fn normalize_entries(&self, path: &mut Vec<String>, value: &Value) -> Map<String, Value> {
        let mut entries = Map::new();

        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.push_entry(path, key, child, &mut entries);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.push_entry(path, &index.to_string(), child, &mut entries);
                }
            }
            _ => {}
        }

        entries
    }

    fn push_entry(
        &self,
        path: &mut Vec<String>,
        key: &str,
        value: &Value,
        entries: &mut Map<String, Value>,
    ) {
        path.push(key.to_string());
        if let Some(normalized) = self.normalize(path, value) {
            entries.insert(key.to_string(), normalized);
        }
        path.pop();
    }

    /// Normalize one value found at `path`
    ///
    /// Returns `None` when the value must be omitted from its parent.
    pub fn normalize(&self, path: &mut Vec<String>, value: &Value) -> Option<Value> {
        let value = match value {
            Value::Object(_) | Value::Array(_) => Value::Object(self.normalize_entries(path, value)),
            scalar => self.filter_scalar(path, scalar.clone()),
        };

        accept(value)
    }

    fn filter_scalar(&self, path: &[String], value: Value) -> Value {
        let root = path.first().and_then(|root| self.form.get(root));

        if let Some(group) = root.filter(|element| element.is_repeatable()) {
            return match path.last().and_then(|name| group.base_element(name)) {
                Some(base) => {
                    tracing::trace!(group = group.name(), field = base.name(), "applying base element filters");
                    self.form.filters().apply(base.filters(), value)
                }
                None => value,
            };
        }

        let qualified = path::qualified_name(path);
        match self.form.get(&qualified) {
            Some(element) if !element.filters().is_empty() => {
                tracing::trace!(field = %qualified, "applying element filters");
                self.form.filters().apply(element.filters(), value)
            }
            _ => value,
        }
    }
}

/// Keep non-empty containers and scalars; drop `null` and empty containers
fn accept(value: Value) -> Option<Value> {
    match &value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        _ => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use serde_json::json;

    fn normalize_root(form: &Form, name: &str, value: &Value) -> Map<String, Value> {
        let mut path = vec![name.to_string()];
        Normalizer::new(form).normalize_entries(&mut path, value)
    }

    #[test]
    fn drops_null_and_empty_containers() {
        let form = Form::new();
        let value = json!({"a": null, "b": [], "c": {"d": {}}, "e": "x"});
        assert_eq!(normalize_root(&form, "test", &value), json!({"e": "x"}).as_object().cloned().unwrap());
    }

    #[test]
    fn keeps_empty_string_zero_and_false() {
        let form = Form::new();
        let value = json!({"a": "", "b": 0, "c": false});
        let normalized = normalize_root(&form, "test", &value);
        assert_eq!(Value::Object(normalized), json!({"a": "", "b": 0, "c": false}));
    }

    #[test]
    fn arrays_keep_their_indices() {
        let form = Form::new();
        let value = json!(["a", null, "c"]);
        let normalized = normalize_root(&form, "test", &value);
        assert_eq!(Value::Object(normalized), json!({"0": "a", "2": "c"}));
    }

    #[test]
    fn applies_filters_by_qualified_name() {
        let mut form = Form::new();
        form.add(Element::text("test2[nl]").with_filter("int"));

        let value = json!({"en": "baz", "nl": 123.4});
        let normalized = normalize_root(&form, "test2", &value);
        assert_eq!(Value::Object(normalized), json!({"en": "baz", "nl": 1234}));
    }

    #[test]
    fn repeatable_group_uses_base_elements() {
        let mut form = Form::new();
        form.add(Element::cloneable(
            "people",
            vec![Element::text("email").with_filter("trim").with_filter("lower")],
        ));

        let value = json!({
            "7": {"email": "  A@X.IO ", "name": " Ann "},
            "x": {"email": "B@Y.IO"}
        });
        let normalized = normalize_root(&form, "people", &value);
        assert_eq!(
            Value::Object(normalized),
            json!({
                "7": {"email": "a@x.io", "name": " Ann "},
                "x": {"email": "b@y.io"}
            })
        );
    }

    #[test]
    fn preserves_submission_order() {
        let form = Form::new();
        let value = json!({"z": 1, "a": 2, "m": 3});
        let keys: Vec<String> = normalize_root(&form, "test", &value).keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
