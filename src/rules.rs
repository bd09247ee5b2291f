//! Rule books: the grammar data consumed by the rewriting engine.

use crate::error::LsysError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// An ordered replacement sequence for one symbol.
pub type Production = Vec<String>;

/// The productions active while self-expanding one rule-book symbol.
///
/// The group keyed by symbol `X` always carries `X`'s own production and may carry
/// helper productions (e.g. `TF` inside a Koch curve) that only apply during that
/// nested expansion.
pub type RuleGroup = HashMap<String, Production>;

/// How the renderer should assemble a model's vertex stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimitiveKind {
    #[default]
    Triangles,
    TriangleFan,
    Lines,
    LineLoop,
    LineStrip,
    Points,
}

/// Per-symbol metadata: expansion depth plus rendering hints for the built model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelMeta {
    /// Number of self-expansion passes applied to the symbol. `0` is treated as `1`.
    pub iterations: u32,
    pub style: PrimitiveKind,
    pub use_lighting: bool,
    pub backface_cull: bool,
}

impl Default for ModelMeta {
    fn default() -> Self {
        Self {
            iterations: 1,
            style: PrimitiveKind::Triangles,
            use_lighting: false,
            backface_cull: false,
        }
    }
}

impl ModelMeta {
    /// Default metadata with an explicit self-expansion depth.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }
}

/// An immutable grammar: rule groups keyed by symbol plus per-symbol metadata.
///
/// Rule books are never edited in place. The `with_*` methods consume and return a new
/// value, and regenerating a grammar means building a fresh book.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default, rename = "rules")]
    groups: HashMap<String, RuleGroup>,
    #[serde(default)]
    meta: HashMap<String, ModelMeta>,
}

impl RuleBook {
    /// An empty rule book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the rule group for `symbol`.
    pub fn with_group<I, K, P, T>(mut self, symbol: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let group = rules
            .into_iter()
            .map(|(k, p)| (k.into(), p.into_iter().map(Into::into).collect()))
            .collect();
        self.groups.insert(symbol.into(), group);
        self
    }

    /// Adds a group holding only `symbol`'s own production.
    pub fn with_rule<P, T>(self, symbol: impl Into<String>, production: P) -> Self
    where
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let symbol = symbol.into();
        self.with_group(symbol.clone(), [(symbol, production)])
    }

    /// Sets the metadata for `symbol`.
    pub fn with_meta(mut self, symbol: impl Into<String>, meta: ModelMeta) -> Self {
        self.meta.insert(symbol.into(), meta);
        self
    }

    /// The rule group rewriting `symbol`, if it is rewritable.
    pub fn group(&self, symbol: &str) -> Option<&RuleGroup> {
        self.groups.get(symbol)
    }

    /// Whether `symbol` owns a rule group.
    pub fn contains(&self, symbol: &str) -> bool {
        self.groups.contains_key(symbol)
    }

    /// Metadata for `symbol`, if any was given.
    pub fn meta(&self, symbol: &str) -> Option<&ModelMeta> {
        self.meta.get(symbol)
    }

    /// Metadata for `symbol`, falling back to [`ModelMeta::default`].
    pub fn meta_or_default(&self, symbol: &str) -> ModelMeta {
        self.meta.get(symbol).copied().unwrap_or_default()
    }

    /// Self-expansion depth for `symbol`. Missing or zero depths count as one pass.
    pub fn depth_of(&self, symbol: &str) -> u32 {
        self.meta
            .get(symbol)
            .map_or(1, |m| m.iterations)
            .max(1)
    }

    /// Every rewritable symbol, in no particular order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of rule groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Parses a rule book from JSON (`{"rules": ..., "meta": ...}`).
    pub fn from_json_str(source: &str) -> Result<Self, LsysError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parses a rule book from TOML with `[rules.X]` and `[meta.X]` tables.
    pub fn from_toml_str(source: &str) -> Result<Self, LsysError> {
        Ok(toml::from_str(source)?)
    }

    /// Loads a rule book from a `.json` or `.toml` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LsysError> {
        let path = path.as_ref();
        let parse: fn(&str) -> Result<Self, LsysError> =
            match path.extension().and_then(|e| e.to_str()) {
                Some("json") => Self::from_json_str,
                Some("toml") => Self::from_toml_str,
                _ => return Err(LsysError::UnsupportedFormat(path.to_path_buf())),
            };
        let content = std::fs::read_to_string(path).map_err(|source| LsysError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let book = parse(&content)?;
        log::debug!("loaded {} rule groups from {}", book.len(), path.display());
        Ok(book)
    }
}
