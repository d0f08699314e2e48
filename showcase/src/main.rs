use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use vitrine::build::{Builder, BuildError, Event, Summary};
use vitrine::templating::EngineInit;
use vitrine::templating::minijinja::MiniJinjaEngine;

use crate::config::Settings;

#[macro_use]
mod log;
mod config;

pub const CONFIG_FILE: &str = "showcase.toml";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Builds the static catalog site of a project.
        cmd showcase {
            /// The project root. Defaults to the current directory.
            optional root: PathBuf
            /// Skip pages whose template fails to render instead of stopping.
            optional -k, --keep-going
            /// Load and resolve every page without rendering or writing.
            optional --check
        }
    }
}

pub use flags::Showcase;

pub fn main() -> ExitCode {
    let flags = Showcase::from_env_or_exit();
    let root = flags.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut settings = match Settings::discover(&root) {
        Ok(settings) => settings,
        Err(e) => {
            log!("error"; "{e}");
            return ExitCode::from(1);
        }
    };

    settings.apply(&flags);
    let config = &settings.build;
    let start = Instant::now();
    let engine = MiniJinjaEngine::init(&config.templates_dir(), &settings.globals);
    let builder = Builder::new(config, &engine);
    let result = match flags.check {
        true => builder.check(report),
        false => builder.build(report),
    };

    match &result {
        Ok(summary) => {
            let verb = if flags.check { "checked" } else { "generated" };
            log!("build"; "{verb} {} pages, skipped {} in {}ms",
                summary.generated.len(), summary.skipped.len(), start.elapsed().as_millis());
        }
        Err(e) => log!("error"; "{e}"),
    }

    ExitCode::from(exit_code(&result))
}

fn report(event: Event<'_>) {
    match event {
        Event::AssetsCopied { count } => log!("build"; "copied {count} asset files"),
        Event::Generated { page, output } => {
            log!("build"; "{} -> {}", page.path.display(), output.display())
        }
        Event::Checked { page, components } => {
            log!("check"; "{} ({components} components)", page.path.display())
        }
        Event::Skipped { page, error } => {
            log!("skip"; "{} ({}): {error}", page.path.display(), error.kind())
        }
    }
}

/// `0` when every page succeeded, `2` when some were skipped, `1` when the
/// build stopped.
fn exit_code(result: &Result<Summary, BuildError>) -> u8 {
    match result {
        Ok(summary) if summary.is_complete() => 0,
        Ok(_) => 2,
        Err(_) => 1,
    }
}
