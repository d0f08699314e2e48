//! A small, strict static page builder.
//!
//! # Overview
//!
//! Vitrine turns a directory of JSON page definitions into static HTML files.
//! Each page names a template and carries the data that template renders:
//!
//! ```text
//!   data/examples/pages/*.json ──► discover ──► resolve `_load:` ──► render ──► output/*.html
//!                                                    │
//!                                             data/**/*.json
//! ```
//!
//! A build proceeds as follows:
//!
//! 1. Static assets are copied from the prototype directory ([`assets`]).
//! 2. Page definitions are listed in file-name order ([`discover`]).
//! 3. Every string of the form `_load:<path>` in a definition is replaced by
//!    the parsed JSON at `<path>` ([`resolve`]). Paths are relative to the
//!    project root, never to the file holding the marker.
//! 4. The resolved definition becomes the template context ([`page`]) and is
//!    rendered with the named template ([`templating`]).
//! 5. The result is written to `<output>/<page id>.html` ([`build`]).
//!
//! Pages that cannot be loaded or resolved are reported and skipped. They
//! never stop the remaining pages from building.
//!
//! ## Components
//!
//! Index-style pages list their building blocks under `components`, each with
//! a `component_name` and `params`. Templates compose them by including
//! `components/<component_name>.html` with `params` in scope. See
//! [`page::Context::components()`].

#[macro_use]
pub mod error;
pub mod fstree;
pub mod value;
pub mod discover;
pub mod resolve;
pub mod page;
pub mod assets;
pub mod templating;
pub mod build;

pub use build::{Builder, Config, RenderPolicy, BuildError, PageError, Summary, Event};
