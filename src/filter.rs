//! Named filter registry (the sanitize service)
//!
//! A filter maps one scalar value to another. Elements list filter names;
//! the registry applies them in order, so `[f1, f2]` yields `f2(f1(x))`.
//!
//! Containers and `null` pass through every standard filter unchanged.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::{Number, Value};

/// A single sanitizing function
pub type FilterFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

// ============================================================================
// LAZY REGEX PATTERNS (compiled once)
// ============================================================================

static NOT_INT_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9+\-]").unwrap());

static NOT_FLOAT_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9+\-.]").unwrap());

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+\-]?[0-9]+").unwrap());

static LEADING_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+\-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static NOT_ALPHANUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());

/// Filter registry keyed by filter name
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: FxHashMap<String, FilterFn>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard sanitizers:
    /// `int`, `absint`, `float`, `trim`, `lower`, `upper`, `string`, `alphanum`
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("int", |v: &Value| map_scalar(v, |s| Value::from(to_int(s))));
        registry.register("absint", |v: &Value| {
            map_scalar(v, |s| Value::from(to_int(s).unsigned_abs()))
        });
        registry.register("float", |v: &Value| map_scalar(v, |s| to_float(s)));
        registry.register("trim", |v: &Value| map_string(v, |s| s.trim().to_string()));
        registry.register("lower", |v: &Value| map_string(v, str::to_lowercase));
        registry.register("upper", |v: &Value| map_string(v, str::to_uppercase));
        registry.register("string", |v: &Value| {
            map_string(v, |s| TAG.replace_all(s, "").into_owned())
        });
        registry.register("alphanum", |v: &Value| {
            map_scalar(v, |s| Value::String(NOT_ALPHANUM.replace_all(s, "").into_owned()))
        });
        registry
    }

    /// Register (or replace) a filter under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Check if a filter is registered
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Apply a single named filter
    ///
    /// Unknown names leave the value unchanged.
    pub fn sanitize(&self, value: Value, name: &str) -> Value {
        match self.filters.get(name) {
            Some(filter) => filter(&value),
            None => {
                tracing::warn!(filter = name, "unknown filter, value left unchanged");
                value
            }
        }
    }

    /// Apply a filter pipeline in order
    pub fn apply(&self, names: &[String], value: Value) -> Value {
        names
            .iter()
            .fold(value, |value, name| self.sanitize(value, name))
    }
}

/// String form of a scalar the way form posts see it (`true` → "1", `false` → "")
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn map_scalar(value: &Value, f: impl Fn(&str) -> Value) -> Value {
    match scalar_text(value) {
        Some(text) => f(&text),
        None => value.clone(),
    }
}

fn map_string(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

/// Keep digits and signs, then read the leading integer (0 when none)
///
/// Out-of-range integers saturate at `i64::MAX` / `i64::MIN`.
fn to_int(text: &str) -> i64 {
    let cleaned = NOT_INT_CHAR.replace_all(text, "");
    let Some(digits) = LEADING_INT.find(&cleaned).map(|m| m.as_str()) else {
        return 0;
    };

    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn to_float(text: &str) -> Value {
    let cleaned = NOT_FLOAT_CHAR.replace_all(text, "");
    let parsed = LEADING_FLOAT
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);
    Number::from_f64(parsed).map(Value::Number).unwrap_or(Value::from(0))
}
