use std::{io::ErrorKind, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::Error;

/// Environment variable selecting the API origin.
pub const API_URL_VAR: &str = "AMS_API_URL";

/// Describing the client configuration.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base url every endpoint path is appended to.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Where the session record is persisted.
    pub storage_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_owned(),
            timeout_secs: 30,
            storage_path: PathBuf::from("./data/session.json"),
        }
    }
}

impl ClientConfig {
    /// Reads the config from a toml file, falling back to defaults if the
    /// file does not exist, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config = match std::fs::read_to_string(path) {
            Ok(string) => toml::from_str(&string)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(config.with_env())
    }

    /// Overrides the api url with [`API_URL_VAR`] if it is set.
    pub fn with_env(mut self) -> Self {
        if let Some(url) = std::env::var(API_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            self.api_url = url;
        }
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
