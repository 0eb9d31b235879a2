//! Configuration and form definitions loaded from YAML
//!
//! ```yaml
//! templates:
//!   path: forms/
//!   default_name: element
//! form_factory:
//!   data_providers: [colors]
//! ```

use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::decorator::Decorator;
use crate::element::{Element, ElementType};
use crate::error::FormError;
use crate::filter::FilterRegistry;
use crate::form::Form;
use crate::validation::Validator;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub form_factory: FormFactoryConfig,
}

/// Decorator template defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub default_name: Option<String>,
}

/// Form-builder settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFactoryConfig {
    /// Data provider identifiers offered by the settings sub-form
    #[serde(default)]
    pub data_providers: Vec<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, FormError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, FormError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

/// Form definition (a list of elements)
#[derive(Debug, Clone, Deserialize)]
pub struct FormDef {
    pub elements: Vec<ElementDef>,
}

/// Element definition
#[derive(Debug, Clone, Deserialize)]
pub struct ElementDef {
    pub name: String,
    #[serde(default, rename = "type")]
    pub element_type: ElementType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Select options, value → label, in declaration order
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub default: Option<Value>,
    /// Base elements of a cloneable group
    #[serde(default)]
    pub base_elements: Vec<ElementDef>,
    #[serde(default)]
    pub template: Option<TemplateDef>,
}

/// Per-element decorator template
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDef {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl FormDef {
    pub fn from_yaml(yaml: &str) -> Result<Self, FormError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, FormError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Build a form, checking filter names and validator patterns
    pub fn into_form(self, filters: FilterRegistry, templates: TemplatesConfig) -> Result<Form, FormError> {
        let mut form = Form::with_filters(filters).with_templates(templates);
        for def in self.elements {
            let element = def.into_element(form.filters())?;
            form.add(element);
        }
        Ok(form)
    }
}

impl ElementDef {
    pub fn into_element(self, filters: &FilterRegistry) -> Result<Element, FormError> {
        if let Some(unknown) = self.filters.iter().find(|f| !filters.contains(f)) {
            return Err(FormError::UnknownFilter {
                element: self.name,
                filter: unknown.clone(),
            });
        }

        for validator in &self.validators {
            if let Validator::Regex { pattern, .. } = validator {
                Regex::new(pattern).map_err(|e| FormError::InvalidPattern {
                    element: self.name.clone(),
                    pattern: pattern.clone(),
                    details: e.to_string(),
                })?;
            }
        }

        let mut element = match self.element_type {
            ElementType::Cloneable => {
                let base = self
                    .base_elements
                    .into_iter()
                    .map(|def| def.into_element(filters))
                    .collect::<Result<Vec<_>, _>>()?;
                Element::cloneable(self.name, base)
            }
            other => Element::new(self.name, other),
        };

        if let Some(label) = self.label {
            element = element.with_label(label);
        }
        for filter in self.filters {
            element = element.with_filter(filter);
        }
        for validator in self.validators {
            element = element.with_validator(validator);
        }
        for (name, value) in self.attributes {
            element = element.with_attribute(name, value);
        }
        for (value, label) in self.options {
            let label = match label {
                Value::String(s) => s,
                other => other.to_string(),
            };
            element = element.with_option(value, label);
        }
        if let Some(default) = self.default {
            element = element.with_default(default);
        }
        if let Some(template) = self.template {
            let mut decorator = Decorator::new();
            if let Some(path) = template.path {
                decorator.set_template_path(path);
            }
            if let Some(name) = template.name {
                decorator.set_template_name(name);
            }
            element = element.with_decorator(decorator);
        }

        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FORM_YAML: &str = r#"
elements:
  - name: integer
    filters: [int]
  - name: test2[en]
    validators:
      - presence_of: {}
  - name: color
    type: select
    label: Color
    options:
      "": "---"
      red: Red
  - name: people
    type: cloneable
    base_elements:
      - name: email
        filters: [trim, lower]
    template:
      path: forms/
      name: cloneable
"#;

    #[test]
    fn parse_config() {
        let config = Config::from_yaml(
            r#"
templates:
  path: views/forms/
  default_name: element
form_factory:
  data_providers: [colors, countries]
"#,
        )
        .unwrap();
        assert_eq!(config.templates.default_name.as_deref(), Some("element"));
        assert_eq!(config.form_factory.data_providers, ["colors", "countries"]);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert!(config.templates.path.is_none());
        assert!(config.form_factory.data_providers.is_empty());
    }

    #[test]
    fn build_form_from_definition() {
        let form = FormDef::from_yaml(FORM_YAML)
            .unwrap()
            .into_form(FilterRegistry::standard(), TemplatesConfig::default())
            .unwrap();

        assert_eq!(form.len(), 4);
        assert_eq!(form.get("integer").unwrap().filters(), ["int".to_string()]);
        assert_eq!(form.get("test2[en]").unwrap().validators().len(), 1);

        let color = form.get("color").unwrap();
        assert_eq!(color.label(), Some("Color"));
        assert_eq!(color.options()[0], (String::new(), "---".to_string()));

        let people = form.get("people").unwrap();
        assert!(people.is_repeatable());
        assert!(people.base_element("email").is_some());
        assert_eq!(people.decorator().unwrap().template_name(), Some("cloneable"));
        assert_eq!(people.user_option("_type"), Some(&json!("cloneable")));
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let def = FormDef::from_yaml("elements: [{ name: x, filters: [rot13] }]").unwrap();
        let err = def
            .into_form(FilterRegistry::standard(), TemplatesConfig::default())
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownFilter { ref filter, .. } if filter == "rot13"));
    }

    #[test]
    fn invalid_regex_is_rejected_at_load() {
        let def = FormDef::from_yaml(r#"elements: [{ name: x, validators: [{ regex: { pattern: "([" } }] }]"#)
            .unwrap();
        let err = def
            .into_form(FilterRegistry::standard(), TemplatesConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("FORM-012"));
    }

    #[test]
    fn unknown_element_type_is_a_yaml_error() {
        let err = FormDef::from_yaml("elements: [{ name: x, type: slider }]").unwrap_err();
        assert!(matches!(err, FormError::YamlParse(_)));
    }
}
