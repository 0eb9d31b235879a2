//! In-memory placeholder views with token caching
//!
//! Templates are plain text with `{{ name }}` / `{{ element.label }}`
//! placeholders resolved against the render variables. Each template is
//! tokenized once and the tokens shared through an `Arc`.
//! Unknown placeholders are kept as written.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::decorator::{RenderError, View};
use crate::error::FormError;
use crate::path;

/// Template file extension loaded by [`MemoryViews::from_dir`]
pub const TEMPLATE_EXTENSION: &str = "tpl";

/// Token representing a parsed template fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text (range in the template source)
    Literal(Range<usize>),
    /// Placeholder: dotted variable path plus its source span
    Var { path: Vec<String>, span: Range<usize> },
}

/// Views held in memory, keyed by template path
#[derive(Default)]
pub struct MemoryViews {
    templates: FxHashMap<String, String>,
    /// Tokenized templates keyed by source
    cache: DashMap<String, Arc<Vec<Token>>>,
    views_dir: Option<String>,
}

impl MemoryViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(path.into(), source.into());
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.templates.contains_key(path)
    }

    /// Load every `*.tpl` under `dir`, keyed by relative path without extension
    ///
    /// `dir/forms/element.tpl` is available as `forms/element`.
    pub fn from_dir(dir: &Path) -> Result<Self, FormError> {
        let pattern = format!(
            "{}/**/*.{}",
            glob::Pattern::escape(&dir.display().to_string()),
            TEMPLATE_EXTENSION
        );
        let scan_error = |details: String| FormError::TemplateScan {
            pattern: pattern.clone(),
            details,
        };

        let mut views = Self::new();
        for entry in glob::glob(&pattern).map_err(|e| scan_error(e.to_string()))? {
            let path = entry.map_err(|e| scan_error(e.to_string()))?;
            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };

            let key = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let source = std::fs::read_to_string(&path)?;
            views.insert(key, source);
        }

        tracing::debug!(dir = %dir.display(), templates = views.templates.len(), "loaded templates");
        Ok(views)
    }

    /// Parse template into tokens (with caching)
    pub fn tokenize(&self, source: &str) -> Arc<Vec<Token>> {
        if let Some(cached) = self.cache.get(source) {
            return Arc::clone(&cached);
        }

        let mut tokens = Vec::new();
        let mut cursor = 0;

        while let Some(open) = source[cursor..].find("{{") {
            let start = cursor + open;
            let Some(close) = source[start + 2..].find("}}") else {
                break;
            };
            let end = start + 2 + close + 2;

            if start > cursor {
                tokens.push(Token::Literal(cursor..start));
            }

            let expr = source[start + 2..end - 2].trim();
            if expr.is_empty() {
                tokens.push(Token::Literal(start..end));
            } else {
                tokens.push(Token::Var {
                    path: expr.split('.').map(str::to_string).collect(),
                    span: start..end,
                });
            }
            cursor = end;
        }

        if cursor < source.len() {
            tokens.push(Token::Literal(cursor..source.len()));
        }

        let tokens = Arc::new(tokens);
        self.cache.insert(source.to_string(), Arc::clone(&tokens));
        tokens
    }

    /// Substitute placeholders in `source`
    pub fn render_source(&self, source: &str, variables: &Map<String, Value>) -> String {
        let tokens = self.tokenize(source);
        let mut out = String::with_capacity(source.len() * 2);

        for token in tokens.iter() {
            match token {
                Token::Literal(range) => out.push_str(&source[range.clone()]),
                Token::Var { path: segments, span } => {
                    let resolved = segments
                        .split_first()
                        .and_then(|(root, rest)| path::apply(variables.get(root)?, rest));
                    match resolved {
                        Some(value) => out.push_str(&display(value)),
                        // Keep placeholder as written if not found
                        None => out.push_str(&source[span.clone()]),
                    }
                }
            }
        }

        out
    }
}

impl View for MemoryViews {
    fn views_dir(&self) -> Option<&str> {
        self.views_dir.as_deref()
    }

    fn set_views_dir(&mut self, dir: Option<String>) {
        self.views_dir = dir;
    }

    fn partial(&self, path: &str, variables: &Map<String, Value>) -> Result<String, RenderError> {
        let source = self
            .templates
            .get(path)
            .ok_or_else(|| RenderError::TemplateNotFound {
                path: path.to_string(),
                views_dir: self.views_dir.clone().unwrap_or_default(),
            })?;
        Ok(self.render_source(source, variables))
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
