use serde::{Deserialize, Serialize};

/// Descriptive info a hub returns from its connect endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub total_echos: u64,
    #[serde(default)]
    pub today_echos: u64,
    #[serde(default)]
    pub sys_username: String,
}

impl NodeMetadata {
    /// Display name, or `fallback` when the hub reports none
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.server_name.is_empty() {
            fallback
        } else {
            &self.server_name
        }
    }

    /// Logo reference, or `fallback` when the hub reports none
    pub fn logo_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.logo.is_empty() {
            fallback
        } else {
            &self.logo
        }
    }
}
