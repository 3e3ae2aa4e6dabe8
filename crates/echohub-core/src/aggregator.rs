//! Page fan-out / fan-in across every live hub.
//!
//! One page request goes to all hubs at once and waits for every one of them
//! to settle. Failed hubs contribute nothing to the page; the rest are
//! decorated with their origin, concatenated in hub order and stable-sorted
//! newest first.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::client::HubClient;
use crate::config::HubConfig;
use crate::constants::{DEFAULT_LOGO, DEFAULT_SERVER_NAME};
use crate::error::{HubError, NodeFailure};
use crate::models::{parse_created_at, FeedItem, NodeIdentity, NodeMetadata, PageRequest};
use crate::prober::NodeRegistry;

/// Fallbacks stamped on echoes when a hub's metadata is blank
#[derive(Debug, Clone)]
pub struct OriginDefaults {
    pub logo: String,
    pub server_name: String,
}

impl Default for OriginDefaults {
    fn default() -> Self {
        Self {
            logo: DEFAULT_LOGO.to_string(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

impl From<&HubConfig> for OriginDefaults {
    fn from(config: &HubConfig) -> Self {
        Self {
            logo: config.default_logo.clone(),
            server_name: config.default_server_name.clone(),
        }
    }
}

/// One hub's successful answer for one page
#[derive(Debug, Clone)]
pub struct NodeBatch {
    pub node: NodeIdentity,
    pub items: Vec<FeedItem>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageOutcome {
    pub page: u32,
    pub items: Vec<FeedItem>,
    /// At least one hub returned a full page
    pub has_more: bool,
    pub failures: Vec<NodeFailure>,
}

/// Query `page` from every hub in the registry and merge the answers.
///
/// Never fails as a whole: hub errors are logged, listed in
/// `PageOutcome::failures` and otherwise ignored.
#[instrument(skip(client, registry, defaults), fields(nodes = registry.len()))]
pub async fn fetch_page(
    client: &HubClient,
    registry: &NodeRegistry,
    page: u32,
    page_size: usize,
    defaults: &OriginDefaults,
) -> PageOutcome {
    let request = PageRequest { page, page_size };
    let nodes = registry.nodes();

    let results = join_all(nodes.iter().map(|node| client.echo_page(node, request))).await;

    let mut batches = Vec::with_capacity(nodes.len());
    let mut failures = Vec::new();

    for (node, result) in nodes.iter().zip(results) {
        match result {
            Ok(result) => {
                let total = result.total;
                batches.push(NodeBatch {
                    node: node.clone(),
                    items: result.into_items(),
                    total,
                });
            }
            Err(e) => {
                let failure = NodeFailure::new(node, &e);
                let error = HubError::from(failure.clone());
                warn!(page, %error, "Skipping hub for this page");
                failures.push(failure);
            }
        }
    }

    let (items, has_more) = merge_batches(batches, registry, page_size, defaults);
    debug!(page, merged = items.len(), has_more, "Merged page");

    PageOutcome {
        page,
        items,
        has_more,
        failures,
    }
}

/// Decorate, concatenate and sort a page's batches.
///
/// Returns the merged items (newest first, ties in batch order) and whether
/// any batch was full. The flag is a heuristic: a hub whose last page happens
/// to be exactly `page_size` long still reports more.
pub fn merge_batches(
    batches: Vec<NodeBatch>,
    registry: &NodeRegistry,
    page_size: usize,
    defaults: &OriginDefaults,
) -> (Vec<FeedItem>, bool) {
    let has_more = batches.iter().any(|batch| batch.items.len() >= page_size);

    let mut merged = Vec::with_capacity(batches.iter().map(|b| b.items.len()).sum());
    for batch in batches {
        let metadata = registry.get(&batch.node);
        merged.extend(
            batch
                .items
                .into_iter()
                .map(|item| decorate(item, &batch.node, metadata, defaults)),
        );
    }

    sort_newest_first(&mut merged);
    (merged, has_more)
}

/// Stable sort by derived timestamp, descending
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by(|a, b| b.created_ts.cmp(&a.created_ts));
}

fn decorate(
    mut item: FeedItem,
    node: &NodeIdentity,
    metadata: Option<&NodeMetadata>,
    defaults: &OriginDefaults,
) -> FeedItem {
    let created_ts = parse_created_at(&item.created_at);
    if created_ts.is_none() {
        debug!(node = %node, id = item.id, created_at = %item.created_at, "Unparseable timestamp");
    }
    item.created_ts = created_ts.unwrap_or(0);
    item.server_url = node.address().to_string();
    item.server_name = metadata
        .map(|m| m.display_name(&defaults.server_name))
        .unwrap_or(defaults.server_name.as_str())
        .to_string();
    item.logo = metadata
        .map(|m| m.logo_or(&defaults.logo))
        .unwrap_or(defaults.logo.as_str())
        .to_string();
    item
}
