//! Expansion of `_load:` markers in page data.
//!
//! A string of the form `_load:<path>`, found as a dictionary value or an
//! array element, is replaced by the parsed JSON content of `<path>`. The
//! path is always joined onto the resolver's base directory, however deeply
//! the marker is nested and whichever file it came from.
//!
//! ```rust,no_run
//! use vitrine::resolve::Resolver;
//! use vitrine::value::{Json, Format, Value};
//!
//! let page: Value = Json::read(std::path::Path::new("data/pages/index.json"))?;
//! let context = Resolver::new(".").resolve(&page)?;
//! # Ok::<(), vitrine::error::Error>(())
//! ```

use std::fmt;
use std::sync::Arc;
use std::path::{Path, PathBuf};

use crate::error::{Result, Chainable};
use crate::value::{Dict, Format, Json, Value};

pub const LOAD_PREFIX: &str = "_load:";

/// A parsed `_load:<path>` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMarker<'a> {
    raw: &'a str,
    path: &'a str,
}

impl<'a> LoadMarker<'a> {
    /// Parses `value` as a marker. Whitespace around the path is ignored.
    ///
    /// ```rust
    /// use std::path::Path;
    /// use vitrine::resolve::LoadMarker;
    ///
    /// let marker = LoadMarker::parse("_load: data/hero.json").unwrap();
    /// assert_eq!(marker.path(), Path::new("data/hero.json"));
    /// assert!(LoadMarker::parse("load:data/hero.json").is_none());
    /// assert!(LoadMarker::parse("see _load:data/hero.json").is_none());
    /// ```
    pub fn parse(value: &'a str) -> Option<Self> {
        let path = value.strip_prefix(LOAD_PREFIX)?.trim();
        Some(LoadMarker { raw: value, path })
    }

    pub fn path(&self) -> &'a Path {
        Path::new(self.path)
    }

    /// The file this marker refers to when resolved against `base`.
    pub fn target(&self, base: &Path) -> PathBuf {
        base.join(self.path)
    }
}

impl fmt::Display for LoadMarker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

/// Replaces load markers with the content they refer to.
#[derive(Debug, Clone)]
pub struct Resolver {
    base: Arc<Path>,
    nested: bool,
    max_depth: Option<usize>,
}

impl Resolver {
    /// A resolver joining every marker path onto `base`.
    ///
    /// Loaded content is inserted as parsed: markers inside it are left alone
    /// unless [`Resolver::nested()`] is enabled.
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Resolver {
            base: base.as_ref().into(),
            nested: false,
            max_depth: None,
        }
    }

    /// Also resolve markers found inside loaded content, still against the
    /// base directory.
    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Limits the length of a chain of nested loads. Unbounded if `None`.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns a copy of `value` with every marker it contains expanded.
    ///
    /// A bare string at the top level is a scalar, not a marker, and is
    /// returned unchanged.
    pub fn resolve(&self, value: &Value) -> Result<Value> {
        self.resolve_at(value, 0)
    }

    pub fn resolve_dict(&self, dict: &Dict) -> Result<Dict> {
        self.dict_at(dict, 0)
    }

    fn resolve_at(&self, value: &Value, depth: usize) -> Result<Value> {
        match value {
            Value::Dict(dict) => Ok(Value::Dict(Arc::new(self.dict_at(dict, depth)?))),
            Value::Array(items) => items.iter()
                .map(|item| self.slot(item, depth))
                .collect::<Result<Vec<_>>>()
                .map(|items| Value::Array(Arc::new(items))),
            _ => Ok(value.clone()),
        }
    }

    fn dict_at(&self, dict: &Dict, depth: usize) -> Result<Dict> {
        dict.iter()
            .map(|(key, value)| self.slot(value, depth).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Resolves a value held in a dictionary entry or array position.
    fn slot(&self, value: &Value, depth: usize) -> Result<Value> {
        match value.as_str().and_then(LoadMarker::parse) {
            Some(marker) => self.load(marker, depth),
            None => self.resolve_at(value, depth),
        }
    }

    fn load(&self, marker: LoadMarker<'_>, depth: usize) -> Result<Value> {
        let target = marker.target(&self.base);
        if let Some(max) = self.max_depth.filter(|max| depth >= *max) {
            return err! {
                "load marker nesting is too deep",
                "marker" => marker,
                "maximum depth" => max,
            };
        }

        let loaded: Value = Json::read(target.as_path()).chain_with(|| error! {
            "failed to resolve load marker",
            "marker" => marker,
            "target" => target.display(),
        })?;

        if !self.nested {
            return Ok(loaded);
        }

        self.resolve_at(&loaded, depth + 1).chain_with(|| error! {
            "failed to resolve content loaded by marker",
            "marker" => marker,
        })
    }
}
