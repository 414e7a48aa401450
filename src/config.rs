use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CopyError, Result};

/// Config file looked up when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Settings for one copy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Local workbook to copy.
    pub source: PathBuf,
    /// Identifier of the destination spreadsheet.
    pub destination: String,
    /// Service-account key file used to authenticate.
    pub credentials: PathBuf,
}

#[derive(Deserialize)]
struct RawConfig {
    source: Option<String>,
    destination: Option<String>,
    credentials: Option<String>,
}

impl Config {
    /// Reads the JSON config at `path`.
    ///
    /// Every attribute must be present and non-empty. Relative `source` and
    /// `credentials` paths are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CopyError::ConfigNotFound(path.to_path_buf()));
        }

        let data = fs::read_to_string(path)?;
        let raw: RawConfig = serde_json::from_str(&data)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        Ok(Self {
            source: base.join(required(raw.source, "source")?),
            destination: required(raw.destination, "destination")?,
            credentials: base.join(required(raw.credentials, "credentials")?),
        })
    }
}

fn required(value: Option<String>, attribute: &'static str) -> Result<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(CopyError::MissingConfigAttribute(attribute))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let error = Config::load(Path::new("that_config_path_does_not_exist.json")).unwrap_err();
        assert!(matches!(error, CopyError::ConfigNotFound(_)));
    }

    #[test]
    fn missing_attribute_is_reported() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"source": "book.xlsx", "destination": "", "credentials": "key.json"}"#,
        )
        .expect("config written");

        let error = Config::load(&path).unwrap_err();
        assert!(matches!(error, CopyError::MissingConfigAttribute("destination")));
    }

    #[test]
    fn relative_paths_follow_config_location() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("config.json");
        let absolute_key = dir.path().join("keys").join("key.json");
        let body = serde_json::json!({
            "source": "book.xlsx",
            "destination": "1AbCdEf",
            "credentials": absolute_key,
        });
        fs::write(&path, body.to_string()).expect("config written");

        let config = Config::load(&path).expect("config loaded");
        assert_eq!(config.source, dir.path().join("book.xlsx"));
        assert_eq!(config.destination, "1AbCdEf");
        assert_eq!(config.credentials, absolute_key);
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ source: ").expect("config written");
        assert!(matches!(Config::load(&path), Err(CopyError::Json(_))));
    }
}
