use std::collections::HashSet;

use tracing::{info, warn};

use crate::client::HubClient;
use crate::config::HubConfig;
use crate::error::HubError;
use crate::models::{HubEntry, NodeIdentity};

/// Where the hub list comes from
#[derive(Debug, Clone)]
pub enum DirectorySource {
    /// External directory endpoint returning `{code, msg, data: [HubEntry]}`
    Remote(String),
    /// Hubs listed directly in configuration
    Static(Vec<HubEntry>),
}

impl DirectorySource {
    pub fn from_config(config: &HubConfig) -> Self {
        match config.directory_source.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => DirectorySource::Remote(url.to_string()),
            _ => DirectorySource::Static(config.hubs.clone()),
        }
    }

    /// Resolve the source into a normalized, deduplicated node list.
    ///
    /// Any failure of a remote source maps to `DirectoryUnavailable`. An empty
    /// list is returned as-is.
    pub async fn resolve(&self, client: &HubClient) -> Result<Vec<NodeIdentity>, HubError> {
        let entries = match self {
            DirectorySource::Remote(url) => client
                .fetch_directory(url)
                .await
                .map_err(|e| HubError::DirectoryUnavailable(e.to_string()))?,
            DirectorySource::Static(entries) => entries.clone(),
        };

        let nodes = normalize_entries(&entries);
        info!(entries = entries.len(), nodes = nodes.len(), "Resolved hub directory");
        Ok(nodes)
    }
}

/// Normalize entries and drop duplicates, keeping first-seen order
pub fn normalize_entries(entries: &[HubEntry]) -> Vec<NodeIdentity> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(entries.len());

    for entry in entries {
        let node = NodeIdentity::from(entry);
        if node.address().is_empty() {
            warn!(entry = ?entry, "Skipping hub entry with empty address");
            continue;
        }
        if seen.insert(node.clone()) {
            nodes.push(node);
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entries_dedups() {
        let entries = vec![
            HubEntry::Url("https://a.example/".into()),
            HubEntry::Url("https://b.example".into()),
            HubEntry::Connected {
                id: 1,
                connect_url: "https://a.example".into(),
            },
            HubEntry::Url("   ".into()),
        ];

        let nodes = normalize_entries(&entries);
        let addresses: Vec<&str> = nodes.iter().map(|n| n.address()).collect();
        assert_eq!(addresses, vec!["https://a.example", "https://b.example"]);
        // First occurrence wins
        assert_eq!(nodes[0].id(), None);
    }

    #[test]
    fn test_source_from_config() {
        let config = HubConfig {
            hubs: vec![HubEntry::Url("https://a.example".into())],
            ..Default::default()
        };
        assert!(matches!(
            DirectorySource::from_config(&config),
            DirectorySource::Static(ref hubs) if hubs.len() == 1
        ));

        let config = HubConfig {
            directory_source: Some("https://dir.example/hubs".into()),
            ..config
        };
        assert!(matches!(
            DirectorySource::from_config(&config),
            DirectorySource::Remote(ref url) if url == "https://dir.example/hubs"
        ));
    }

    #[tokio::test]
    async fn test_static_source_resolves_without_network() {
        let client = HubClient::new(std::time::Duration::from_secs(1)).unwrap();
        let source = DirectorySource::Static(vec![]);
        let nodes = source.resolve(&client).await.unwrap();
        assert!(nodes.is_empty());
    }
}
