use crate::models::NodeIdentity;

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Hub directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("No reachable hubs ({attempted} probed)")]
    NoReachableNodes {
        attempted: usize,
        failures: Vec<NodeFailure>,
    },

    #[error("Query to hub {node} failed: {reason}")]
    NodeQueryFailed { node: String, reason: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Hub rejected request (code {code}): {msg}")]
    Rejected { code: i64, msg: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A per-node failure that was absorbed instead of propagated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeFailure {
    pub node: String,
    pub reason: String,
}

impl From<NodeFailure> for HubError {
    fn from(failure: NodeFailure) -> Self {
        HubError::NodeQueryFailed {
            node: failure.node,
            reason: failure.reason,
        }
    }
}

impl NodeFailure {
    pub fn new(node: &NodeIdentity, error: &HubError) -> Self {
        Self {
            node: node.address().to_string(),
            reason: error.to_string(),
        }
    }
}
