use std::collections::HashMap;

use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::client::HubClient;
use crate::error::{HubError, NodeFailure};
use crate::models::{NodeIdentity, NodeMetadata};

/// Live hubs in directory order, with the metadata each one reported
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<NodeIdentity>,
    metadata: HashMap<NodeIdentity, NodeMetadata>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live hub. A repeated identity replaces the metadata but keeps
    /// its original position.
    pub fn insert(&mut self, node: NodeIdentity, metadata: NodeMetadata) {
        if self.metadata.insert(node.clone(), metadata).is_none() {
            self.nodes.push(node);
        }
    }

    pub fn get(&self, node: &NodeIdentity) -> Option<&NodeMetadata> {
        self.metadata.get(node)
    }

    pub fn contains(&self, node: &NodeIdentity) -> bool {
        self.metadata.contains_key(node)
    }

    pub fn nodes(&self) -> &[NodeIdentity] {
        &self.nodes
    }

    /// Live hubs paired with their metadata, in directory order
    pub fn iter(&self) -> impl Iterator<Item = (&NodeIdentity, &NodeMetadata)> {
        self.nodes
            .iter()
            .filter_map(|node| self.metadata.get(node).map(|meta| (node, meta)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub registry: NodeRegistry,
    pub failures: Vec<NodeFailure>,
}

/// Probe every hub concurrently and keep the ones that answer.
///
/// Individual failures are logged and listed in the report. Returns
/// `NoReachableNodes` only when no hub answered at all.
#[instrument(skip_all, fields(nodes = nodes.len()))]
pub async fn probe(client: &HubClient, nodes: &[NodeIdentity]) -> Result<ProbeReport, HubError> {
    let results = join_all(nodes.iter().map(|node| client.connect(node))).await;

    let mut registry = NodeRegistry::new();
    let mut failures = Vec::new();

    for (node, result) in nodes.iter().zip(results) {
        match result {
            Ok(metadata) => registry.insert(node.clone(), metadata),
            Err(e) => {
                warn!(node = %node, error = %e, "Hub probe failed");
                failures.push(NodeFailure::new(node, &e));
            }
        }
    }

    if registry.is_empty() {
        return Err(HubError::NoReachableNodes {
            attempted: nodes.len(),
            failures,
        });
    }

    info!(
        live = registry.len(),
        failed = failures.len(),
        "Probed hubs"
    );
    Ok(ProbeReport { registry, failures })
}
