//! Template-based element decoration
//!
//! A decorator renders one element through a [`View`] collaborator.
//! Template name and path come from the decorator, falling back to the
//! `templates` section of the configuration. Failures are returned as
//! [`RenderError`]; callers decide whether to log and substitute.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::TemplatesConfig;
use crate::element::Element;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("FORM-060: No template name for element '{element}' (set one or configure templates.default_name)")]
    TemplateNameMissing { element: String },

    #[error("FORM-061: Template '{path}' not found, template path used: '{views_dir}'")]
    TemplateNotFound { path: String, views_dir: String },
}

/// Rendering collaborator (the host's view layer)
pub trait View {
    /// Current views directory
    fn views_dir(&self) -> Option<&str>;

    fn set_views_dir(&mut self, dir: Option<String>);

    /// Render the partial at `path` with `variables`
    fn partial(&self, path: &str, variables: &Map<String, Value>) -> Result<String, RenderError>;
}

/// Per-element decorator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decorator {
    template_path: Option<String>,
    template_name: Option<String>,
    variables: Map<String, Value>,
}

impl Decorator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template_path(mut self, path: impl Into<String>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn template_path(&self) -> Option<&str> {
        self.template_path.as_deref()
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    pub fn set_template_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn set_template_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn set_variables(&mut self, variables: Map<String, Value>) -> &mut Self {
        self.variables = variables;
        self
    }

    pub fn add_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Render `element` with its current `value`
    ///
    /// The view's directory is switched to the template path for the
    /// call and restored afterwards, whether rendering succeeds or not.
    pub fn render(
        &self,
        element: &Element,
        value: Option<&Value>,
        attributes: &Map<String, Value>,
        view: &mut dyn View,
        templates: &TemplatesConfig,
    ) -> Result<String, RenderError> {
        let template_name = self
            .template_name
            .as_deref()
            .or(templates.default_name.as_deref())
            .ok_or_else(|| RenderError::TemplateNameMissing {
                element: element.name().to_string(),
            })?;
        let template_path = self.template_path.as_deref().or(templates.path.as_deref());

        let mut variables = self.variables.clone();
        variables.insert("element".into(), element_variables(element, attributes));
        variables.insert("value".into(), value.cloned().unwrap_or(Value::Null));
        variables.insert("attributes".into(), Value::Object(attributes.clone()));

        let previous_dir = view.views_dir().map(str::to_string);
        if let Some(dir) = template_path {
            view.set_views_dir(Some(dir.to_string()));
        }

        let partial = format!("{}{}", template_path.unwrap_or_default(), template_name);
        let content = view.partial(&partial, &variables);

        view.set_views_dir(previous_dir);
        content
    }
}

/// Variables describing the element itself
fn element_variables(element: &Element, attributes: &Map<String, Value>) -> Value {
    let mut merged = element.attributes().clone();
    for (key, value) in attributes {
        merged.insert(key.clone(), value.clone());
    }

    let options: Vec<Value> = element
        .options()
        .iter()
        .map(|(value, label)| json!({"value": value, "label": label}))
        .collect();

    json!({
        "name": element.name(),
        "label": element.label().unwrap_or_default(),
        "type": element.element_type().as_str(),
        "attributes": merged,
        "options": options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// View that echoes the requested path and records the views dir
    #[derive(Default)]
    struct EchoView {
        dir: Option<String>,
        seen_dir: std::cell::RefCell<Option<String>>,
    }

    impl View for EchoView {
        fn views_dir(&self) -> Option<&str> {
            self.dir.as_deref()
        }

        fn set_views_dir(&mut self, dir: Option<String>) {
            self.dir = dir;
        }

        fn partial(&self, path: &str, variables: &Map<String, Value>) -> Result<String, RenderError> {
            *self.seen_dir.borrow_mut() = self.dir.clone();
            if path.ends_with("missing") {
                return Err(RenderError::TemplateNotFound {
                    path: path.to_string(),
                    views_dir: self.dir.clone().unwrap_or_default(),
                });
            }
            Ok(format!("{path}:{}:{}", variables["element"]["name"], variables["value"]))
        }
    }

    #[test]
    fn renders_with_configured_default_name() {
        let mut view = EchoView::default();
        let templates = TemplatesConfig {
            path: None,
            default_name: Some("element".into()),
        };
        let out = Decorator::new()
            .render(&Element::text("email"), Some(&json!("a@b.c")), &Map::new(), &mut view, &templates)
            .unwrap();
        assert_eq!(out, r#"element:"email":"a@b.c""#);
    }

    #[test]
    fn missing_name_is_an_error() {
        let mut view = EchoView::default();
        let err = Decorator::new()
            .render(&Element::text("email"), None, &Map::new(), &mut view, &TemplatesConfig::default())
            .unwrap_err();
        assert_eq!(err, RenderError::TemplateNameMissing { element: "email".into() });
    }

    #[test]
    fn views_dir_is_switched_then_restored() {
        let mut view = EchoView {
            dir: Some("app/views/".into()),
            ..Default::default()
        };
        let decorator = Decorator::new()
            .with_template_path("forms/")
            .with_template_name("missing");

        let err = decorator
            .render(&Element::text("x"), None, &Map::new(), &mut view, &TemplatesConfig::default())
            .unwrap_err();

        assert!(matches!(err, RenderError::TemplateNotFound { ref path, .. } if path == "forms/missing"));
        assert_eq!(view.seen_dir.borrow().as_deref(), Some("forms/"));
        assert_eq!(view.dir.as_deref(), Some("app/views/"));
    }

    #[test]
    fn call_attributes_override_element_attributes() {
        let element = Element::text("x").with_attribute("class", "a").with_attribute("id", "x");
        let mut attributes = Map::new();
        attributes.insert("class".into(), json!("b"));

        let vars = element_variables(&element, &attributes);
        assert_eq!(vars["attributes"], json!({"class": "b", "id": "x"}));
        assert_eq!(vars["type"], json!("text"));
    }
}
