//! Configuration Management
//!
//! Loads backend connection settings for live-mode clients from a JSON file.

use crate::error::{NbxError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Backend connection configuration
///
/// ```json
/// { "url": "https://netbox.example.com/api", "apikey": "0123abcd..." }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base address, e.g. `https://netbox.example.com/api`
    pub url: String,
    /// API token, sent as `Authorization: Token <apikey>`
    pub apikey: String,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(NbxError::Config("url must not be empty".to_string()));
        }
        if self.apikey.is_empty() {
            return Err(NbxError::Config("apikey must not be empty".to_string()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed, so paths can be appended
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "https://netbox.local/api/", "apikey": "secret"}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.url, "https://netbox.local/api/");
        assert_eq!(config.base_url(), "https://netbox.local/api");
        assert_eq!(config.apikey, "secret");
    }

    #[test]
    fn rejects_empty_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"url": "", "apikey": "secret"}}"#).unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(NbxError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Config::from_file("/nonexistent/nbx-config.json"),
            Err(NbxError::Io(_))
        ));
    }
}
