//! Input settings sub-form
//!
//! Validates the settings of each input a form builder creates: type,
//! unique name, required flag, label, default, placeholder and an
//! optional data provider for selectable inputs.
//!
//! Data providers are resolved through an explicit registry at startup.
//! A submitted provider identifier is only ever looked up, never used to
//! construct anything.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::element::Element;
use crate::error::FormError;
use crate::form::Form;
use crate::validation::Validator;

/// Param name used for element type recognition
pub const TYPE_PARAM: &str = "type";
/// Param name used for field identification (unique)
pub const IDENTIFIER_PARAM: &str = "name";
/// Param name used if a field should be required
pub const REQUIRED_PARAM: &str = "required";
pub const LABEL_PARAM: &str = "label";
pub const DEFAULTS_PARAM: &str = "defaults";
pub const PLACEHOLDER_PARAM: &str = "placeholder";
/// Param name used for the data provider identifier
pub const DATA_PARAM: &str = "data";

/// Source of selectable options (value → label)
pub trait DataProvider: Send + Sync {
    /// Display name shown in the provider select
    fn name(&self) -> &str;

    fn data(&self) -> Vec<(String, String)>;
}

type ProviderFactory = Box<dyn Fn() -> Arc<dyn DataProvider> + Send + Sync>;

/// Registry of provider factories keyed by identifier
#[derive(Default)]
pub struct DataProviderRegistry {
    factories: FxHashMap<String, ProviderFactory>,
}

impl fmt::Debug for DataProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("DataProviderRegistry").field("providers", &ids).finish()
    }
}

impl DataProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn DataProvider> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Instantiate the configured providers, in configuration order
    pub fn select(&self, ids: &[String]) -> Result<DataProviders, FormError> {
        let mut providers = Vec::with_capacity(ids.len());
        for id in ids {
            let factory = self
                .factories
                .get(id)
                .ok_or_else(|| FormError::UnknownProvider { id: id.clone() })?;
            providers.push((id.clone(), factory()));
        }
        Ok(DataProviders { providers })
    }
}

/// Providers resolved at startup
#[derive(Clone, Default)]
pub struct DataProviders {
    providers: Vec<(String, Arc<dyn DataProvider>)>,
}

impl fmt::Debug for DataProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.providers.iter().map(|(id, _)| id)).finish()
    }
}

impl DataProviders {
    pub fn get(&self, id: &str) -> Option<&Arc<dyn DataProvider>> {
        self.providers.iter().find(|(key, _)| key == id).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn DataProvider)> {
        self.providers.iter().map(|(id, p)| (id.as_str(), p.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// The settings sub-form
#[derive(Debug, Clone)]
pub struct InputSettings {
    form: Form,
    providers: DataProviders,
}

impl InputSettings {
    pub fn new(providers: DataProviders) -> Self {
        let mut form = Form::new();

        form.add(Element::hidden(TYPE_PARAM));
        form.add(
            Element::text(IDENTIFIER_PARAM)
                .with_validator(Validator::presence_of())
                .with_label("Unique ID"),
        );
        form.add(
            Element::check(REQUIRED_PARAM)
                .with_attribute("value", true)
                .with_label("Required field"),
        );
        form.add(Element::text(LABEL_PARAM).with_label("Label"));
        form.add(Element::text(DEFAULTS_PARAM).with_label("Default value"));
        form.add(Element::text(PLACEHOLDER_PARAM).with_label("Placeholder text"));

        let data = Element::select(DATA_PARAM)
            .with_option("", "---")
            .with_options(providers.iter().map(|(id, p)| (id.to_string(), p.name().to_string())))
            .with_label("Data provider");
        form.add(data);

        Self { form, providers }
    }

    /// Build the sub-form offering the providers listed in
    /// `form_factory.data_providers`
    ///
    /// Fails with `UnknownProvider` if a configured identifier is not
    /// registered.
    pub fn from_config(registry: &DataProviderRegistry, config: &Config) -> Result<Self, FormError> {
        let providers = registry.select(&config.form_factory.data_providers)?;
        tracing::debug!(providers = providers.len(), "resolved data providers");
        Ok(Self::new(providers))
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Options of the selected data provider
    ///
    /// No selection yields an empty list. A selection that is not one of
    /// the offered providers is an error.
    pub fn data_from_provider(&self) -> Result<Vec<(String, String)>, FormError> {
        let selected = match self.form.get_value(DATA_PARAM) {
            None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
            Some(serde_json::Value::String(s)) if s.is_empty() => return Ok(Vec::new()),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let offered = self
            .form
            .get(DATA_PARAM)
            .is_some_and(|select| select.has_option(&selected));

        match self.providers.get(&selected) {
            Some(provider) if offered => Ok(provider.data()),
            _ => Err(FormError::ProviderNotFound { id: selected }),
        }
    }
}
