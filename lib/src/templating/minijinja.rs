use std::path::Path;

use minijinja::{Environment, path_loader};
use minijinja::value::Value;
use serde::Serialize;

use crate::page::Context;
use crate::error::{Result, Chainable};
use crate::templating::{Engine, EngineInit};

/// Jinja-style templating. Templates ending in `.html`, `.htm`, or `.xml`
/// are auto-escaped.
#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init<G: Serialize>(templates: &Path, globals: G) -> Self::Engine {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates));
        env.add_global("G", Value::from_serialize(&globals));
        env.add_function("asset", ext::asset);
        MiniJinjaEngine { env }
    }
}

impl Engine for MiniJinjaEngine {
    fn render(&self, name: &str, context: &Context) -> Result<String> {
        let template = self.env.get_template(name).chain_with(|| error! {
            "failed to load template",
            "template" => name,
        })?;

        Ok(template.render(context)?)
    }
}

mod ext {
    use minijinja::State;
    use minijinja::value::Value;

    use crate::build::STATIC_PREFIX;

    /// Joins the page's `static_prefix` and `path`.
    pub fn asset(state: &State, path: &str) -> Value {
        let prefix = state.lookup(STATIC_PREFIX);
        let prefix = prefix.as_ref().and_then(|v| v.as_str()).unwrap_or("");
        Value::from_safe_string(join(prefix, path))
    }

    pub fn join(prefix: &str, path: &str) -> String {
        if prefix.is_empty() {
            return path.to_owned();
        }

        format!("{}/{}", prefix.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
