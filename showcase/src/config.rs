use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use vitrine::build::{Config, RenderPolicy};
use vitrine::error::Result;
use vitrine::value::{Format, Toml, Value};

use crate::flags::Showcase;

/// The contents of an optional `showcase.toml` at the project root.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub build: Config,
    /// Exposed to every template as `G`.
    #[serde(default)]
    pub globals: FxHashMap<String, Value>,
}

impl Settings {
    /// Reads the settings of the project at `root`. A missing settings file
    /// yields the defaults.
    pub fn discover(root: &Path) -> Result<Settings> {
        let path = root.join(crate::CONFIG_FILE);
        let mut settings: Settings = match path.is_file() {
            true => Toml::read(path.as_path())?,
            false => Settings::default(),
        };

        settings.build.root = root.to_path_buf();
        Ok(settings)
    }

    /// Applies command-line overrides.
    pub fn apply(&mut self, flags: &Showcase) {
        if flags.keep_going {
            self.build.on_render_error = RenderPolicy::Skip;
        }
    }
}
