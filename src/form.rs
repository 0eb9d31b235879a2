//! Form: element registry and binding orchestrator
//!
//! `bind` runs in two passes:
//! 1. field bind: top-level scalars whose key is exactly a registered
//!    element name are filtered and assigned
//! 2. array bind: containers under a registered root name are normalized
//!    and then reindexed or deep-merged onto the entity's prior value
//!
//! Keys with no registered root are never written to the entity.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};

use crate::config::TemplatesConfig;
use crate::decorator::{Decorator, View};
use crate::element::Element;
use crate::entity::Entity;
use crate::error::FormError;
use crate::filter::FilterRegistry;
use crate::normalize::Normalizer;
use crate::path;
use crate::reindex;
use crate::validation::Message;

/// A form: registered elements plus the data of the last bind
#[derive(Debug, Clone)]
pub struct Form {
    elements: Vec<Element>,
    /// name → position in `elements`
    index: FxHashMap<String, usize>,
    filters: FilterRegistry,
    templates: TemplatesConfig,
    /// Raw data of the last bind
    data: Map<String, Value>,
    messages: Vec<Message>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Create a form using the standard filters
    pub fn new() -> Self {
        Self::with_filters(FilterRegistry::standard())
    }

    pub fn with_filters(filters: FilterRegistry) -> Self {
        Self {
            elements: Vec::new(),
            index: FxHashMap::default(),
            filters,
            templates: TemplatesConfig::default(),
            data: Map::new(),
            messages: Vec::new(),
        }
    }

    pub fn with_templates(mut self, templates: TemplatesConfig) -> Self {
        self.templates = templates;
        self
    }

    // ─────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────

    /// Register an element
    ///
    /// Tags the element with its `_type` user option. An element with the
    /// same name replaces the earlier one in place.
    pub fn add(&mut self, mut element: Element) -> &mut Self {
        element.set_user_option("_type", element.element_type().as_str());

        match self.index.get(element.name()) {
            Some(&position) => self.elements[position] = element,
            None => {
                self.index.insert(element.name().to_string(), self.elements.len());
                self.elements.push(element);
            }
        }
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.index.get(name).map(|&position| &self.elements[position])
    }

    pub fn remove(&mut self, name: &str) -> Option<Element> {
        let position = self.index.remove(name)?;
        let element = self.elements.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(element)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn templates(&self) -> &TemplatesConfig {
        &self.templates
    }

    /// Deduplicated root names of all registered elements
    pub fn root_names(&self) -> FxHashSet<String> {
        self.elements
            .iter()
            .map(|element| path::root_name(element.name()))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────

    /// Bind submitted `data` onto `entity`
    ///
    /// With a non-empty `allow_list`, only the listed top-level names are
    /// bound. Never fails: anomalies drop the value or pass it through.
    pub fn bind<E>(&mut self, data: &Map<String, Value>, entity: &mut E, allow_list: Option<&[String]>) -> &mut Self
    where
        E: Entity + ?Sized,
    {
        self.data = data.clone();
        self.messages.clear();

        self.bind_fields(data, entity, allow_list);
        self.bind_arrays(data, entity, allow_list);
        self
    }

    fn bind_fields<E>(&self, data: &Map<String, Value>, entity: &mut E, allow_list: Option<&[String]>)
    where
        E: Entity + ?Sized,
    {
        for (name, value) in data {
            if is_container(value) {
                continue;
            }
            let Some(element) = self.get(name) else {
                continue;
            };
            if !is_allowed(name, allow_list) {
                tracing::debug!(field = %name, "not in allow list, skipped");
                continue;
            }

            let value = self.filters.apply(element.filters(), value.clone());
            tracing::debug!(field = %name, "bound field");
            entity.set_attribute(name, value);
        }
    }

    fn bind_arrays<E>(&self, data: &Map<String, Value>, entity: &mut E, allow_list: Option<&[String]>)
    where
        E: Entity + ?Sized,
    {
        let raw_names = self.root_names();
        let normalizer = Normalizer::new(self);

        for (name, values) in data {
            if !is_container(values) {
                continue;
            }
            if !raw_names.contains(name.as_str()) {
                tracing::debug!(field = %name, "no registered element, ignored");
                continue;
            }
            if !is_allowed(name, allow_list) {
                tracing::debug!(field = %name, "not in allow list, skipped");
                continue;
            }

            let mut segments = vec![name.clone()];
            let new_values = normalizer.normalize_entries(&mut segments, values);
            let prior = entity.get_attribute(name).cloned().unwrap_or(Value::Null);

            let sequential = reindex::is_sequential(&new_values);
            let merged = reindex::merge(prior, new_values);
            tracing::debug!(field = %name, sequential, "bound array");
            entity.set_attribute(name, merged);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Values and validation
    // ─────────────────────────────────────────────────────────────

    /// Value of a (possibly bracketed) field name from the last bind
    ///
    /// Falls back to the element default when nothing was submitted.
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        let segments = path::parse(name);
        let (root, rest) = segments.split_first()?;

        let base = self
            .data
            .get(root)
            .or_else(|| self.get(root).and_then(Element::default_value));

        match base {
            Some(base) => path::apply(base, rest),
            None => self.get(name).and_then(Element::default_value),
        }
    }

    /// Raw data retained from the last bind
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Run every element's validators against the bound values
    pub fn is_valid(&mut self) -> Result<bool, FormError> {
        let mut messages = Vec::new();

        for element in &self.elements {
            let value = self.get_value(element.name());
            for validator in element.validators() {
                if let Some(message) = validator.validate(element.name(), value)? {
                    messages.push(message);
                }
            }
        }

        tracing::debug!(failures = messages.len(), "validated form");
        self.messages = messages;
        Ok(self.messages.is_empty())
    }

    /// Messages from the last validation
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages.iter().filter(move |m| m.field == name)
    }

    // ─────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────

    /// Render an element through its decorator (or a default one)
    pub fn render(&self, name: &str, attributes: &Map<String, Value>, view: &mut dyn View) -> Result<String, FormError> {
        let element = self.get(name).ok_or_else(|| FormError::UnknownElement {
            name: name.to_string(),
        })?;

        let fallback = Decorator::new();
        let decorator = element.decorator().unwrap_or(&fallback);

        decorator
            .render(element, self.get_value(name), attributes, view, &self.templates)
            .map_err(|err| {
                tracing::warn!(element = name, error = %err, "element render failed");
                FormError::from(err)
            })
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn is_allowed(name: &str, allow_list: Option<&[String]>) -> bool {
    match allow_list {
        None => true,
        Some(list) => list.is_empty() || list.iter().any(|allowed| allowed == name),
    }
}
