use std::sync::Arc;

use serde::Serialize;

use crate::discover::PageFile;
use crate::error::{Result, Chainable};
use crate::resolve::Resolver;
use crate::value::{Dict, Format, Json, Value};

/// The key naming a page's template.
pub const TEMPLATE: &str = "template";

/// The key holding an index page's ordered component list.
pub const COMPONENTS: &str = "components";

/// A page definition as read from disk, before resolution.
#[derive(Debug, Clone)]
pub struct Page {
    pub file: PageFile,
    pub definition: Dict,
}

impl Page {
    /// Reads and parses `file`, which must hold a JSON object.
    pub fn load(file: PageFile) -> Result<Page> {
        let value: Value = Json::read(&*file.path)?;
        let definition = value.into_dict().map_err(|v| error! {
            "page definition must be a JSON object",
            "found" => v.kind(),
            "path" => file.path.display(),
        })?;

        let definition = Arc::try_unwrap(definition).unwrap_or_else(|arc| (*arc).clone());
        Ok(Page { file, definition })
    }

    pub fn id(&self) -> &str {
        &self.file.id
    }

    /// The template name, if present as a non-empty string.
    pub fn template(&self) -> Option<&str> {
        self.definition.get(TEMPLATE)
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
    }

    /// The output file name: the page id with `ext` appended.
    pub fn output_name(&self, ext: &str) -> String {
        format!("{}.{ext}", self.file.id)
    }

    /// Expands every load marker in the definition.
    pub fn resolve(&self, resolver: &Resolver) -> Result<Context> {
        resolver.resolve_dict(&self.definition)
            .map(Context)
            .chain_with(|| error! {
                "failed to resolve page data",
                "page" => self.file.path.display(),
            })
    }
}

/// A fully resolved page definition: the template context.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Context(Dict);

/// One entry of an index page's `components` list.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRef {
    pub component_name: Arc<str>,
    pub params: Arc<Dict>,
}

impl Context {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets `key`, replacing any value the page defined for it.
    pub fn insert<K: Into<Arc<str>>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn as_dict(&self) -> &Dict {
        &self.0
    }

    pub fn into_dict(self) -> Dict {
        self.0
    }

    /// The page's components, in order. Empty if the page has none.
    ///
    /// Each entry needs a string `component_name`. A missing `params` is
    /// read as an empty dictionary.
    pub fn components(&self) -> Result<Vec<ComponentRef>> {
        let Some(list) = self.get(COMPONENTS) else {
            return Ok(vec![]);
        };

        let list = list.as_slice().ok_or_else(|| error! {
            "`components` must be an array",
            "found" => list.kind(),
        })?;

        list.iter().enumerate().map(|(i, entry)| -> Result<ComponentRef> {
            let component_name = entry.get("component_name")
                .and_then(|name| name.as_str())
                .ok_or_else(|| error! {
                    "component is missing a string `component_name`",
                    "position" => i,
                })?;

            let params = match entry.get("params") {
                None | Some(Value::Null) => Arc::default(),
                Some(Value::Dict(params)) => params.clone(),
                Some(other) => return err! {
                    "component `params` must be an object",
                    "component" => component_name,
                    "found" => other.kind(),
                },
            };

            Ok(ComponentRef { component_name: component_name.into(), params })
        }).collect()
    }
}

impl From<Dict> for Context {
    fn from(dict: Dict) -> Self {
        Context(dict)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn page_file(dir: &Path, name: &str, json: &str) -> PageFile {
        let path = dir.join(format!("{name}.json"));
        fs::write(&path, json).unwrap();
        PageFile { id: name.into(), path: path.into() }
    }

    #[test]
    fn template_must_be_a_non_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            (r#"{"template": "index.html"}"#, Some("index.html")),
            (r#"{"template": ""}"#, None),
            (r#"{"template": 3}"#, None),
            (r#"{"title": "Cart"}"#, None),
        ];

        for (json, expected) in cases {
            let page = Page::load(page_file(dir.path(), "cart", json)).unwrap();
            assert_eq!(page.template(), expected, "{json}");
        }
    }

    #[test]
    fn non_object_definitions_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let error = Page::load(page_file(dir.path(), "list", "[1, 2]")).unwrap_err();
        assert_eq!(error.message(), "page definition must be a JSON object");
        assert_eq!(error.context_value("found").as_deref(), Some("array"));

        assert!(Page::load(page_file(dir.path(), "broken", "{")).is_err());
    }

    #[test]
    fn output_name_comes_from_the_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let page = Page::load(page_file(dir.path(), "spring.sale", r#"{"template": "x.html"}"#)).unwrap();
        assert_eq!(page.id(), "spring.sale");
        assert_eq!(page.output_name("html"), "spring.sale.html");
    }

    #[test]
    fn resolution_errors_name_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let file = page_file(dir.path(), "index", r#"{"hero": "_load:missing.json"}"#);
        let page = Page::load(file.clone()).unwrap();

        let error = page.resolve(&Resolver::new(dir.path())).unwrap_err();
        assert_eq!(error.message(), "failed to resolve page data");
        assert_eq!(error.context_value("page"), Some(file.path.display().to_string()));
        assert_eq!(error.context_value("marker").as_deref(), Some("_load:missing.json"));
    }

    #[test]
    fn components_are_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hero.json"), r#"{"title": "Welcome"}"#).unwrap();
        let file = page_file(dir.path(), "index", r#"{
            "template": "index.html",
            "components": [
                {"component_name": "hero", "params": "_load:hero.json"},
                {"component_name": "newsletter"},
                {"component_name": "footer", "params": {"year": 2024}}
            ]
        }"#);

        let context = Page::load(file).unwrap().resolve(&Resolver::new(dir.path())).unwrap();
        let components = context.components().unwrap();
        let names: Vec<_> = components.iter().map(|c| &*c.component_name).collect();
        assert_eq!(names, ["hero", "newsletter", "footer"]);
        assert_eq!(components[0].params.get("title"), Some(&Value::from("Welcome")));
        assert!(components[1].params.is_empty());
        assert_eq!(components[2].params.get("year"), Some(&Value::from(2024u32)));
    }

    #[test]
    fn malformed_components_are_reported() {
        let context = |json: &str| Context::from(serde_json::from_str::<Dict>(json).unwrap());

        assert!(context("{}").components().unwrap().is_empty());
        assert!(context(r#"{"components": {"hero": {}}}"#).components().is_err());
        assert!(context(r#"{"components": [{"params": {}}]}"#).components().is_err());
        assert!(context(r#"{"components": [{"component_name": "hero", "params": []}]}"#)
            .components().is_err());
    }

    #[test]
    fn inserted_keys_override_page_values() {
        let mut context = Context::from(serde_json::from_str::<Dict>(r#"{"static_prefix": "x"}"#).unwrap());
        assert_eq!(context.insert("static_prefix", "."), Some(Value::from("x")));
        assert_eq!(context.get("static_prefix"), Some(&Value::from(".")));
    }
}
