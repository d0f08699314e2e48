//! The build orchestrator: discovery, resolution, rendering, and output.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Chainable, Error, Result};
use crate::discover::{discover, PageFile, Pages};
use crate::page::{Context, Page};
use crate::resolve::Resolver;
use crate::templating::Engine;
use crate::value::Sink;

/// The context key holding the asset-path prefix.
pub const STATIC_PREFIX: &str = "static_prefix";

/// What to do when a page's template fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    /// Stop the whole build.
    #[default]
    Abort,
    /// Report the page as skipped and continue.
    Skip,
}

/// Build settings. Relative paths are relative to `root`, which is also the
/// base directory of every load marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub root: PathBuf,
    pub templates: PathBuf,
    pub pages: PathBuf,
    pub output: PathBuf,
    pub assets: PathBuf,
    /// Directories under `assets` copied into the output.
    pub asset_dirs: Vec<String>,
    pub page_ext: String,
    pub output_ext: String,
    pub static_prefix: String,
    pub on_render_error: RenderPolicy,
    /// Resolve load markers inside loaded content too.
    pub nested_loads: bool,
    /// Longest allowed chain of nested loads.
    pub max_load_depth: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from("."),
            templates: "templates".into(),
            pages: "data/examples/pages".into(),
            output: "output".into(),
            assets: "prototype".into(),
            asset_dirs: vec!["css".into(), "js".into(), "img".into()],
            page_ext: "json".into(),
            output_ext: "html".into(),
            static_prefix: String::new(),
            on_render_error: RenderPolicy::Abort,
            nested_loads: false,
            max_load_depth: None,
        }
    }
}

impl Config {
    /// The default configuration for the project at `root`.
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        Config { root: root.into(), ..Config::default() }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(&self.templates)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(&self.pages)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(&self.assets)
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(&self.root)
            .nested(self.nested_loads)
            .max_depth(self.max_load_depth)
    }
}

/// Why a single page produced no output.
#[derive(Debug)]
pub enum PageError {
    /// The definition file is unreadable, not JSON, or not an object.
    Load(Error),
    /// The definition has no non-empty string `template`.
    MissingTemplate,
    /// A load marker's target is missing or invalid.
    Reference(Error),
    /// The template failed to render under [`RenderPolicy::Skip`].
    Render(Error),
    /// The `components` list is malformed. Only reported by check mode.
    Component(Error),
}

impl PageError {
    pub fn kind(&self) -> &'static str {
        match self {
            PageError::Load(_) => "load error",
            PageError::MissingTemplate => "missing template",
            PageError::Reference(_) => "reference error",
            PageError::Render(_) => "render error",
            PageError::Component(_) => "component error",
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::MissingTemplate => write!(f, "missing '{}'", crate::page::TEMPLATE),
            PageError::Load(e)
            | PageError::Reference(e)
            | PageError::Render(e)
            | PageError::Component(e) => e.fmt(f),
        }
    }
}

/// Why the whole build stopped.
#[derive(Debug)]
pub enum BuildError {
    /// The page directory does not exist.
    Discovery(Error),
    /// A template failed to render under [`RenderPolicy::Abort`].
    Render { page: PathBuf, template: String, error: Error },
    /// The output could not be prepared or written.
    Io(Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Discovery(e) | BuildError::Io(e) => e.fmt(f),
            BuildError::Render { page, template, error } => {
                writeln!(f, "render error {} -> {template}", page.display())?;
                error.fmt(f)
            }
        }
    }
}

/// Progress reported while building.
#[derive(Debug)]
pub enum Event<'a> {
    AssetsCopied { count: usize },
    Generated { page: &'a PageFile, output: &'a Path },
    Checked { page: &'a PageFile, components: usize },
    Skipped { page: &'a PageFile, error: &'a PageError },
}

/// The outcome of a build that ran to completion.
#[derive(Debug, Default)]
pub struct Summary {
    pub assets: usize,
    /// Output files written, or pages checked in check mode.
    pub generated: Vec<PathBuf>,
    pub skipped: Vec<(PageFile, PageError)>,
}

impl Summary {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Builds every page of a project with an [`Engine`].
#[derive(Debug)]
pub struct Builder<'a> {
    config: &'a Config,
    engine: &'a dyn Engine,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a Config, engine: &'a dyn Engine) -> Self {
        Builder { config, engine }
    }

    /// Copies assets, then renders and writes every discovered page.
    ///
    /// Pages that fail to load or resolve are skipped. Render failures follow
    /// [`Config::on_render_error`].
    pub fn build<F>(&self, mut report: F) -> Result<Summary, BuildError>
        where F: FnMut(Event<'_>)
    {
        let output = self.config.output_dir();
        std::fs::create_dir_all(&output)
            .chain_with(|| error! {
                "failed to create output directory",
                "directory" => output.display(),
            })
            .map_err(BuildError::Io)?;

        let assets = self.config.assets_dir();
        let count = crate::assets::copy_assets(&assets, &output, &self.config.asset_dirs)
            .map_err(BuildError::Io)?;

        report(Event::AssetsCopied { count });
        let mut summary = Summary { assets: count, ..Summary::default() };
        let resolver = self.config.resolver();
        for file in self.pages()? {
            let (page, context) = match self.prepare(&file, &resolver) {
                Ok(prepared) => prepared,
                Err(error) => {
                    report(Event::Skipped { page: &file, error: &error });
                    summary.skipped.push((file, error));
                    continue;
                }
            };

            let template = page.template().unwrap_or_default();
            let html = match self.engine.render(template, &context) {
                Ok(html) => html,
                Err(error) => match self.config.on_render_error {
                    RenderPolicy::Abort => return Err(BuildError::Render {
                        page: file.path.to_path_buf(),
                        template: template.to_owned(),
                        error,
                    }),
                    RenderPolicy::Skip => {
                        let error = PageError::Render(error);
                        report(Event::Skipped { page: &file, error: &error });
                        summary.skipped.push((file, error));
                        continue;
                    }
                },
            };

            let path = output.join(page.output_name(&self.config.output_ext));
            path.write(&html).map_err(BuildError::Io)?;
            report(Event::Generated { page: &file, output: &path });
            summary.generated.push(path);
        }

        Ok(summary)
    }

    /// Loads and resolves every page without rendering or writing anything.
    pub fn check<F>(&self, mut report: F) -> Result<Summary, BuildError>
        where F: FnMut(Event<'_>)
    {
        let mut summary = Summary::default();
        let resolver = self.config.resolver();
        for file in self.pages()? {
            let checked = self.prepare(&file, &resolver).and_then(|(_, context)| {
                context.components().map_err(PageError::Component)
            });

            match checked {
                Ok(components) => {
                    report(Event::Checked { page: &file, components: components.len() });
                    summary.generated.push(file.path.to_path_buf());
                }
                Err(error) => {
                    report(Event::Skipped { page: &file, error: &error });
                    summary.skipped.push((file, error));
                }
            }
        }

        Ok(summary)
    }

    fn pages(&self) -> Result<Pages, BuildError> {
        discover(&self.config.pages_dir(), &self.config.page_ext)
            .map_err(BuildError::Discovery)
    }

    /// Loads `file`, checks its template, and resolves its context.
    fn prepare(&self, file: &PageFile, resolver: &Resolver) -> Result<(Page, Context), PageError> {
        let page = Page::load(file.clone()).map_err(PageError::Load)?;
        if page.template().is_none() {
            return Err(PageError::MissingTemplate);
        }

        let mut context = page.resolve(resolver).map_err(PageError::Reference)?;
        context.insert(STATIC_PREFIX, self.config.static_prefix.as_str());
        Ok((page, context))
    }
}
