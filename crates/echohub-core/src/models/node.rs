use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A hub entry as published by the directory: either a bare URL or a
/// registered connection with its numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HubEntry {
    Url(String),
    Connected { id: i64, connect_url: String },
}

impl HubEntry {
    pub fn url(&self) -> &str {
        match self {
            HubEntry::Url(url) => url,
            HubEntry::Connected { connect_url, .. } => connect_url,
        }
    }
}

/// Normalized handle for one hub. Equality and hashing use the address only,
/// so the same hub listed with and without an id collapses to one identity.
#[derive(Debug, Clone, Serialize)]
pub struct NodeIdentity {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
}

impl NodeIdentity {
    pub fn new(address: &str) -> Self {
        Self {
            address: normalize_address(address),
            id: None,
        }
    }

    pub fn with_id(address: &str, id: i64) -> Self {
        Self {
            address: normalize_address(address),
            id: Some(id),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Join an endpoint path (starting with `/`) onto the hub address
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

impl From<&HubEntry> for NodeIdentity {
    fn from(entry: &HubEntry) -> Self {
        match entry {
            HubEntry::Url(url) => NodeIdentity::new(url),
            HubEntry::Connected { id, connect_url } => NodeIdentity::with_id(connect_url, *id),
        }
    }
}

impl PartialEq for NodeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for NodeIdentity {}

impl Hash for NodeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// Trim whitespace and strip trailing slashes
pub fn normalize_address(address: &str) -> String {
    address.trim().trim_end_matches('/').to_string()
}
