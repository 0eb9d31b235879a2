//! Per-element validators
//!
//! Validators run after a bind against the values the form retained.
//! Only `presence_of` looks at empty values; every other validator
//! accepts an absent or empty value so optional fields stay optional.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FormError;

/// A validator attached to an element
///
/// YAML form: `{ presence_of: {} }`, `{ string_length: { min: 2, max: 10 } }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    PresenceOf {
        #[serde(default)]
        message: Option<String>,
    },
    StringLength {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        message: Option<String>,
    },
    Regex {
        pattern: String,
        #[serde(default)]
        message: Option<String>,
    },
    Numericality {
        #[serde(default)]
        message: Option<String>,
    },
    InclusionIn {
        domain: Vec<Value>,
        #[serde(default)]
        message: Option<String>,
    },
}

/// A failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub field: String,
    pub validator: &'static str,
    pub text: String,
}

impl Validator {
    pub fn presence_of() -> Self {
        Validator::PresenceOf { message: None }
    }

    pub fn string_length(min: Option<usize>, max: Option<usize>) -> Self {
        Validator::StringLength {
            min,
            max,
            message: None,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Validator::Regex {
            pattern: pattern.into(),
            message: None,
        }
    }

    /// Validator name as used in YAML and messages
    pub fn kind(&self) -> &'static str {
        match self {
            Validator::PresenceOf { .. } => "presence_of",
            Validator::StringLength { .. } => "string_length",
            Validator::Regex { .. } => "regex",
            Validator::Numericality { .. } => "numericality",
            Validator::InclusionIn { .. } => "inclusion_in",
        }
    }

    fn custom_message(&self) -> Option<&str> {
        match self {
            Validator::PresenceOf { message }
            | Validator::StringLength { message, .. }
            | Validator::Regex { message, .. }
            | Validator::Numericality { message }
            | Validator::InclusionIn { message, .. } => message.as_deref(),
        }
    }

    /// Validate `value` for `field`, returning a message on failure
    pub fn validate(&self, field: &str, value: Option<&Value>) -> Result<Option<Message>, FormError> {
        let failure = match self {
            Validator::PresenceOf { .. } => {
                is_empty(value).then(|| format!("Field {field} is required"))
            }
            _ if is_empty(value) => None,
            Validator::StringLength { min, max, .. } => {
                let length = text(value).chars().count();
                match (min, max) {
                    (Some(min), _) if length < *min => Some(format!(
                        "Field {field} must be at least {min} characters long"
                    )),
                    (_, Some(max)) if length > *max => Some(format!(
                        "Field {field} must not exceed {max} characters long"
                    )),
                    _ => None,
                }
            }
            Validator::Regex { pattern, .. } => {
                let regex = Regex::new(pattern).map_err(|e| FormError::InvalidPattern {
                    element: field.to_string(),
                    pattern: pattern.clone(),
                    details: e.to_string(),
                })?;
                (!regex.is_match(&text(value)))
                    .then(|| format!("Field {field} does not match the required format"))
            }
            Validator::Numericality { .. } => (text(value).trim().parse::<f64>().is_err())
                .then(|| format!("Field {field} does not have a valid numeric format")),
            Validator::InclusionIn { domain, .. } => {
                let candidate = text(value);
                let included = domain.iter().any(|allowed| text(Some(allowed)) == candidate);
                (!included).then(|| {
                    let list: Vec<String> = domain.iter().map(|v| text(Some(v))).collect();
                    format!("Field {field} must be a part of list: {}", list.join(", "))
                })
            }
        };

        Ok(failure.map(|default| Message {
            field: field.to_string(),
            validator: self.kind(),
            text: self.custom_message().map(str::to_string).unwrap_or(default),
        }))
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_of_rejects_empty() {
        let v = Validator::presence_of();
        assert!(v.validate("name", None).unwrap().is_some());
        assert!(v.validate("name", Some(&json!(""))).unwrap().is_some());
        assert!(v.validate("name", Some(&json!(0))).unwrap().is_none());
        assert!(v.validate("name", Some(&json!("x"))).unwrap().is_none());
    }

    #[test]
    fn presence_message_names_field() {
        let message = Validator::presence_of()
            .validate("test2[en]", None)
            .unwrap()
            .unwrap();
        assert_eq!(message.field, "test2[en]");
        assert_eq!(message.validator, "presence_of");
        assert_eq!(message.text, "Field test2[en] is required");
    }

    #[test]
    fn string_length_bounds() {
        let v = Validator::string_length(Some(2), Some(4));
        assert!(v.validate("f", Some(&json!("a"))).unwrap().is_some());
        assert!(v.validate("f", Some(&json!("abc"))).unwrap().is_none());
        assert!(v.validate("f", Some(&json!("abcde"))).unwrap().is_some());
        // empty is left to presence_of
        assert!(v.validate("f", Some(&json!(""))).unwrap().is_none());
    }

    #[test]
    fn regex_and_invalid_pattern() {
        let v = Validator::regex("^[a-z]+$");
        assert!(v.validate("f", Some(&json!("abc"))).unwrap().is_none());
        assert!(v.validate("f", Some(&json!("ab1"))).unwrap().is_some());

        let broken = Validator::regex("([");
        assert!(matches!(
            broken.validate("f", Some(&json!("x"))),
            Err(FormError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn numericality_accepts_numbers_and_numeric_strings() {
        let v = Validator::Numericality { message: None };
        assert!(v.validate("f", Some(&json!(123.4))).unwrap().is_none());
        assert!(v.validate("f", Some(&json!("42"))).unwrap().is_none());
        assert!(v.validate("f", Some(&json!("4 2"))).unwrap().is_some());
    }

    #[test]
    fn inclusion_in_with_custom_message() {
        let v = Validator::InclusionIn {
            domain: vec![json!("a"), json!(1)],
            message: Some("pick one".into()),
        };
        assert!(v.validate("f", Some(&json!("a"))).unwrap().is_none());
        assert!(v.validate("f", Some(&json!("1"))).unwrap().is_none());
        let message = v.validate("f", Some(&json!("b"))).unwrap().unwrap();
        assert_eq!(message.text, "pick one");
    }

    #[test]
    fn deserialize_from_yaml() {
        let validators: Vec<Validator> = serde_yaml::from_str(
            r#"
- presence_of: {}
- string_length: { min: 2 }
- regex: { pattern: "^x", message: "must start with x" }
"#,
        )
        .unwrap();
        assert_eq!(validators.len(), 3);
        assert_eq!(validators[0], Validator::presence_of());
        assert_eq!(validators[1], Validator::string_length(Some(2), None));
    }
}
