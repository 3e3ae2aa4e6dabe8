use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FIRST_PAGE, DEFAULT_LOGO, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVER_NAME, DIRECTORY_SOURCE_ENV,
};
use crate::error::HubError;
use crate::models::HubEntry;

/// Aggregator configuration, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubConfig {
    /// URL of the external hub directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_source: Option<String>,

    /// Static hub list, used when no directory source is set
    pub hubs: Vec<HubEntry>,

    pub page_size: usize,

    /// Page index the first fan-out requests
    pub first_page: u32,

    /// Per-request timeout applied to every hub call
    pub request_timeout_secs: u64,

    pub default_logo: String,
    pub default_server_name: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            directory_source: None,
            hubs: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            first_page: DEFAULT_FIRST_PAGE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_logo: DEFAULT_LOGO.to_string(),
            default_server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

impl HubConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, HubError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, HubError> {
        Ok(serde_json::from_str(json)?)
    }

    /// `<config dir>/echohub/config.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("echohub").join("config.json"))
    }

    /// Load the explicit path if given, else the default path when it
    /// exists, else defaults. The directory source env var wins over both.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, HubError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };

        if let Ok(source) = std::env::var(DIRECTORY_SOURCE_ENV) {
            if !source.trim().is_empty() {
                config.directory_source = Some(source);
            }
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), HubError> {
        if self.page_size == 0 {
            return Err(HubError::InvalidConfig("pageSize must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(HubError::InvalidConfig(
                "requestTimeoutSecs must be at least 1".into(),
            ));
        }
        let has_source = self
            .directory_source
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_source && self.hubs.is_empty() {
            return Err(HubError::InvalidConfig(
                "set directorySource or list at least one hub".into(),
            ));
        }
        Ok(())
    }
}
