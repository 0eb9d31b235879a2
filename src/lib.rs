//! formbind - nested-path form binding
//!
//! Binds POST-style bracketed submissions (`test[0][1]`) onto entities,
//! renders elements through decorators, and ships the input-settings
//! sub-form used by form builders.

pub mod config;
pub mod decorator;
pub mod element;
pub mod entity;
pub mod error;
pub mod filter;
pub mod form;
pub mod normalize;
pub mod path;
pub mod reindex;
pub mod settings;
pub mod validation;
pub mod view;

pub use config::{Config, FormDef, TemplatesConfig};
pub use decorator::{Decorator, RenderError, View};
pub use element::{Element, ElementType};
pub use entity::{Entity, Record};
pub use error::{FixSuggestion, FormError};
pub use filter::FilterRegistry;
pub use form::Form;
pub use settings::{DataProvider, DataProviderRegistry, DataProviders, InputSettings};
pub use validation::{Message, Validator};
pub use view::MemoryViews;
