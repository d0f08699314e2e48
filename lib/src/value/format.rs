use serde::de::DeserializeOwned;

use crate::error::{ErrorDetail, Result, Chainable};
use crate::value::Source;

/// A text data format that deserializes into Rust values.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Human-readable name used in error messages.
    const NAME: &'static str;

    /// Parses `string` in the format `Self` as a `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads `input` and parses it. Errors name the input path, if any.
    fn read<I: Source, T: DeserializeOwned>(input: I) -> Result<T> {
        let path = input.path().map(|p| p.display().to_string());
        let string = input.read_string()?;
        Self::from_str(&string).chain_with(|| error! {
            format!("failed to parse {}", Self::NAME),
            "path" => path.as_deref().unwrap_or("<memory>"),
        })
    }
}

macro_rules! impl_format {
    ($name:ident ($label:literal) : $func:expr, $E:ty) => (
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const NAME: &'static str = $label;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml("TOML"): toml::from_str, toml::de::Error);
impl_format!(Json("JSON"): serde_json::from_str, serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn parse_failures_name_the_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let error = Json::read::<_, Value>(path.as_path()).unwrap_err();
        assert_eq!(error.message(), "failed to parse JSON");
        assert_eq!(error.context_value("path"), Some(path.display().to_string()));
    }

    #[test]
    fn missing_files_report_the_path() {
        let error = Json::read::<_, Value>(std::path::Path::new("/nonexistent/x.json")).unwrap_err();
        assert!(error.to_string().contains("failed to open file for reading"));
        assert!(error.to_string().contains("/nonexistent/x.json"));
    }

    #[test]
    fn in_memory_input_is_labeled() {
        let value: Value = Toml::read("shop = 'Oak & Ash'").unwrap();
        assert_eq!(value.get("shop"), Some(&Value::from("Oak & Ash")));

        let error = Toml::read::<_, Value>("shop = ").unwrap_err();
        assert_eq!(error.message(), "failed to parse TOML");
        assert_eq!(error.context_value("path").as_deref(), Some("<memory>"));
    }
}
