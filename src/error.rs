//! Error types with fix suggestions
//!
//! The binder itself never fails; these cover definition loading,
//! element lookup, data providers and rendering.

use thiserror::Error;

use crate::decorator::RenderError;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Form definition errors (FORM-010 to FORM-012)
    // ─────────────────────────────────────────────────────────────

    #[error("FORM-010: Element '{name}' is not registered in the form")]
    UnknownElement { name: String },

    #[error("FORM-011: Element '{element}' uses unknown filter '{filter}'")]
    UnknownFilter { element: String, filter: String },

    #[error("FORM-012: Invalid pattern '{pattern}' on element '{element}': {details}")]
    InvalidPattern {
        element: String,
        pattern: String,
        details: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Submitted data errors (FORM-020)
    // ─────────────────────────────────────────────────────────────

    #[error("FORM-020: Invalid {what}: expected a JSON object, got {found}")]
    InvalidData { what: String, found: String },

    // ─────────────────────────────────────────────────────────────
    // Data provider errors (FORM-030 to FORM-031)
    // ─────────────────────────────────────────────────────────────

    #[error("FORM-030: Data provider '{id}' is not available for this field")]
    ProviderNotFound { id: String },

    #[error("FORM-031: Configured data provider '{id}' is not registered")]
    UnknownProvider { id: String },

    // ─────────────────────────────────────────────────────────────
    // Rendering errors (FORM-060 to FORM-062)
    // ─────────────────────────────────────────────────────────────

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("FORM-062: Cannot scan templates with '{pattern}': {details}")]
    TemplateScan { pattern: String, details: String },
}

impl FixSuggestion for FormError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FormError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            FormError::JsonParse(_) => Some("Ensure the file is valid JSON (try parsing with jq)"),
            FormError::Io(_) => Some("Check file path and permissions"),
            FormError::UnknownElement { .. } => {
                Some("Add the element to the form definition or fix the name")
            }
            FormError::UnknownFilter { .. } => {
                Some("Use one of: int, absint, float, trim, lower, upper, string, alphanum")
            }
            FormError::InvalidPattern { .. } => Some("Fix the regex in the validator definition"),
            FormError::InvalidData { .. } => {
                Some("Submitted data and entities must be objects keyed by field name")
            }
            FormError::ProviderNotFound { .. } => {
                Some("Select one of the data providers offered by the 'data' field")
            }
            FormError::UnknownProvider { .. } => {
                Some("Register the provider before listing it in form_factory.data_providers")
            }
            FormError::Render(RenderError::TemplateNameMissing { .. }) => {
                Some("Set a template name on the decorator or templates.default_name in config")
            }
            FormError::Render(RenderError::TemplateNotFound { .. }) => {
                Some("Check the templates directory contains the named template")
            }
            FormError::TemplateScan { .. } => {
                Some("Check the templates directory exists and is readable")
            }
        }
    }
}
