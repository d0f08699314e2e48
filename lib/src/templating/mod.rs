pub mod minijinja;

use std::fmt::Debug;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::page::Context;

pub trait EngineInit {
    type Engine: Engine + 'static;

    /// Creates an engine loading templates from `templates`. `globals` is
    /// exposed to every template as `G`.
    fn init<G: Serialize>(templates: &Path, globals: G) -> Self::Engine;
}

/// A template renderer. The builder treats it as an opaque capability.
pub trait Engine: Send + Sync + Debug {
    /// Renders the template called `name` with `context` as its variables.
    fn render(&self, name: &str, context: &Context) -> Result<String>;
}
