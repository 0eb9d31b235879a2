//! Form elements (registered fields)
//!
//! An element is declared once at form-definition time and stays
//! immutable during a bind. A `Cloneable` element is a repeatable group:
//! it stands for N instances of a fixed set of base elements, addressed
//! as `group[instance][base_name]`.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::decorator::Decorator;
use crate::validation::Validator;

/// Element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    #[default]
    Text,
    Hidden,
    Password,
    Textarea,
    Check,
    Select,
    Cloneable,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Hidden => "hidden",
            ElementType::Password => "password",
            ElementType::Textarea => "textarea",
            ElementType::Check => "check",
            ElementType::Select => "select",
            ElementType::Cloneable => "cloneable",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered form field
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    element_type: ElementType,
    label: Option<String>,
    filters: Vec<String>,
    validators: Vec<Validator>,
    attributes: Map<String, Value>,
    user_options: Map<String, Value>,
    /// Select options in display order (value → label)
    options: Vec<(String, String)>,
    default: Option<Value>,
    /// Base elements of a repeatable group, in declaration order
    base_elements: Vec<Element>,
    decorator: Option<Decorator>,
}

impl Element {
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            label: None,
            filters: Vec::new(),
            validators: Vec::new(),
            attributes: Map::new(),
            user_options: Map::new(),
            options: Vec::new(),
            default: None,
            base_elements: Vec::new(),
            decorator: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Text)
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Hidden)
    }

    pub fn check(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Check)
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Select)
    }

    /// Repeatable group owning `base_elements`
    pub fn cloneable(name: impl Into<String>, base_elements: Vec<Element>) -> Self {
        let mut element = Self::new(name, ElementType::Cloneable);
        element.base_elements = base_elements;
        element
    }

    // ─────────────────────────────────────────────────────────────
    // Builders
    // ─────────────────────────────────────────────────────────────

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push((value.into(), label.into()));
        self
    }

    pub fn with_options<I, K, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        self.options
            .extend(options.into_iter().map(|(k, l)| (k.into(), l.into())));
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    // ─────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|(v, _)| v == value)
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn decorator(&self) -> Option<&Decorator> {
        self.decorator.as_ref()
    }

    pub fn user_option(&self, name: &str) -> Option<&Value> {
        self.user_options.get(name)
    }

    pub fn set_user_option(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.user_options.insert(name.into(), value.into());
    }

    /// Whether this element is a repeatable group
    pub fn is_repeatable(&self) -> bool {
        self.element_type == ElementType::Cloneable
    }

    pub fn base_elements(&self) -> &[Element] {
        &self.base_elements
    }

    /// Base element of a repeatable group by name
    pub fn base_element(&self, name: &str) -> Option<&Element> {
        self.base_elements.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_filters_in_order() {
        let element = Element::text("integer").with_filter("trim").with_filter("int");
        assert_eq!(element.filters(), ["trim".to_string(), "int".to_string()]);
        assert_eq!(element.element_type(), ElementType::Text);
    }

    #[test]
    fn cloneable_exposes_base_elements() {
        let group = Element::cloneable(
            "people",
            vec![Element::text("email").with_filter("lower"), Element::text("name")],
        );
        assert!(group.is_repeatable());
        assert!(group.base_element("email").is_some());
        assert!(group.base_element("phone").is_none());
        assert_eq!(group.base_elements().len(), 2);
    }

    #[test]
    fn select_options_keep_order() {
        let select = Element::select("data")
            .with_option("", "---")
            .with_options([("colors", "Colors"), ("sizes", "Sizes")]);
        let values: Vec<&str> = select.options().iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(values, ["", "colors", "sizes"]);
        assert!(select.has_option("sizes"));
    }

    #[test]
    fn attributes_and_user_options() {
        let mut element = Element::check("required").with_attribute("value", true);
        element.set_user_option("_type", "check");
        assert_eq!(element.attributes().get("value"), Some(&json!(true)));
        assert_eq!(element.user_option("_type"), Some(&json!("check")));
    }

    #[test]
    fn element_type_from_yaml() {
        let kind: ElementType = serde_yaml::from_str("cloneable").unwrap();
        assert_eq!(kind, ElementType::Cloneable);
        assert_eq!(kind.to_string(), "cloneable");
    }
}
