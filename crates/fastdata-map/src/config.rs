use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Tuning for scalar coercion during a copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Trim surrounding whitespace before parsing text into other scalars.
    pub trim_text: bool,
    /// `chrono` formats tried, in order, after RFC 3339 when parsing text
    /// into a date-time. Parsed values are taken as UTC.
    pub datetime_formats: Vec<String>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            trim_text: true,
            datetime_formats: vec!["%Y-%m-%d %H:%M:%S".into(), "%Y-%m-%dT%H:%M:%S".into()],
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> MapResult<Self> {
        toml::from_str(input).map_err(|e| MapError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| MapError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config() {
        let c = MapperConfig::default();
        assert!(c.trim_text);
        assert_eq!(c.datetime_formats.len(), 2);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = MapperConfig::from_toml_str("trim_text = false").unwrap();
        assert!(!c.trim_text);
        assert_eq!(c.datetime_formats, MapperConfig::default().datetime_formats);
    }

    #[test]
    fn full_toml() {
        let c = MapperConfig::from_toml_str(
            r#"
            trim_text = true
            datetime_formats = ["%d/%m/%Y %H:%M"]
            "#,
        )
        .unwrap();
        assert_eq!(c.datetime_formats, vec!["%d/%m/%Y %H:%M".to_string()]);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = MapperConfig::from_toml_str("trim_text = 3").unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "trim_text = false").unwrap();
        let c = MapperConfig::load(file.path()).unwrap();
        assert!(!c.trim_text);
    }

    #[test]
    fn load_missing_file() {
        let err = MapperConfig::load("/nonexistent/fastdata-mapper.toml").unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }
}
