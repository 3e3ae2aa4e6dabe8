//! Session-scoped feed assembly.
//!
//! `FeedSession` owns the resolved hubs and the running `FeedState`. The
//! state sits behind a mutex that is only held for flag checks and the merge
//! step; the in-flight flag keeps at most one page fan-out running, so
//! concurrent `load_next_page` calls on a shared session are skipped rather
//! than queued.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregator::{fetch_page, sort_newest_first, OriginDefaults, PageOutcome};
use crate::client::HubClient;
use crate::config::HubConfig;
use crate::directory::DirectorySource;
use crate::error::{HubError, NodeFailure};
use crate::models::FeedItem;
use crate::prober::{probe, NodeRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// Directory and probe have not completed
    Preparing,
    Ready,
    /// A page fan-out is in flight
    Loading,
    /// No hub signalled further pages; terminal
    Exhausted,
    /// Every hub failed probing; terminal
    NoData,
}

/// Per-hub counters accumulated over the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub items: u64,
    pub failed_pages: u64,
}

#[derive(Debug)]
pub struct FeedState {
    items: Vec<FeedItem>,
    cursor: u32,
    page_size: usize,
    exhausted: bool,
    in_flight: bool,
    preparing: bool,
    prepare_started: bool,
    no_data: bool,
    node_stats: HashMap<String, NodeStats>,
}

impl FeedState {
    pub fn new(page_size: usize, first_page: u32) -> Self {
        Self {
            items: Vec::new(),
            cursor: first_page,
            page_size,
            exhausted: false,
            in_flight: false,
            preparing: true,
            prepare_started: false,
            no_data: false,
            node_stats: HashMap::new(),
        }
    }

    pub fn phase(&self) -> FeedPhase {
        if self.no_data {
            FeedPhase::NoData
        } else if self.preparing {
            FeedPhase::Preparing
        } else if self.in_flight {
            FeedPhase::Loading
        } else if self.exhausted {
            FeedPhase::Exhausted
        } else {
            FeedPhase::Ready
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Mark preparation done; `live` is false when no hub answered the probe
    pub fn finish_preparing(&mut self, live: bool) {
        self.preparing = false;
        self.no_data = !live;
    }

    /// Claim the in-flight slot and return the page to fetch, or the phase
    /// that forbids loading
    pub fn begin_load(&mut self) -> Result<u32, FeedPhase> {
        match self.phase() {
            FeedPhase::Ready => {
                self.in_flight = true;
                Ok(self.cursor)
            }
            phase => Err(phase),
        }
    }

    /// Release the in-flight slot without touching cursor or items
    pub fn abort_load(&mut self) {
        self.in_flight = false;
    }

    /// Fold a finished page into the feed: append, re-sort, advance the
    /// cursor and latch exhaustion.
    pub fn apply_page(&mut self, outcome: PageOutcome) -> PageSummary {
        for item in &outcome.items {
            self.node_stats
                .entry(item.server_url.clone())
                .or_default()
                .items += 1;
        }
        for failure in &outcome.failures {
            self.node_stats
                .entry(failure.node.clone())
                .or_default()
                .failed_pages += 1;
        }

        let added = outcome.items.len();
        self.items.extend(outcome.items);
        sort_newest_first(&mut self.items);

        self.cursor += 1;
        self.exhausted = self.exhausted || !outcome.has_more;
        self.in_flight = false;

        PageSummary {
            page: outcome.page,
            added,
            has_more: outcome.has_more,
            failures: outcome.failures,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub page: u32,
    pub added: usize,
    pub has_more: bool,
    pub failures: Vec<NodeFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded(PageSummary),
    /// The call was a no-op because of the session's phase
    Skipped { phase: FeedPhase },
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub cursor: u32,
    pub page_size: usize,
    pub items: Vec<FeedItem>,
    pub node_stats: BTreeMap<String, NodeStats>,
    pub probe_failures: Vec<NodeFailure>,
}

/// Clears the in-flight flag if a load is dropped before it is applied
struct InFlightGuard<'a> {
    state: &'a Mutex<FeedState>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().abort_load();
        }
    }
}

pub struct FeedSession {
    client: HubClient,
    source: DirectorySource,
    defaults: OriginDefaults,
    state: Mutex<FeedState>,
    registry: RwLock<Arc<NodeRegistry>>,
    probe_failures: RwLock<Vec<NodeFailure>>,
}

impl FeedSession {
    /// Build a session from validated configuration
    pub fn new(config: &HubConfig) -> Result<Self, HubError> {
        config.validate()?;
        let client = HubClient::new(config.request_timeout())?;
        Ok(Self::with_client(client, DirectorySource::from_config(config), config))
    }

    pub fn with_client(client: HubClient, source: DirectorySource, config: &HubConfig) -> Self {
        Self {
            client,
            source,
            defaults: OriginDefaults::from(config),
            state: Mutex::new(FeedState::new(config.page_size, config.first_page)),
            registry: RwLock::new(Arc::new(NodeRegistry::new())),
            probe_failures: RwLock::new(Vec::new()),
        }
    }

    /// Resolve the directory and probe every hub.
    ///
    /// `DirectoryUnavailable` is returned and leaves the session in
    /// `Preparing` so the caller may try again. No reachable hub moves the
    /// session to the terminal `NoData` phase. Calls after a successful
    /// preparation return the current phase.
    pub async fn prepare(&self) -> Result<FeedPhase, HubError> {
        {
            let mut state = self.state.lock();
            if state.phase() != FeedPhase::Preparing || state.prepare_started {
                return Ok(state.phase());
            }
            state.prepare_started = true;
        }

        let nodes = match self.source.resolve(&self.client).await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(error = %e, "Hub directory resolution failed");
                self.state.lock().prepare_started = false;
                return Err(e);
            }
        };

        let live = match probe(&self.client, &nodes).await {
            Ok(report) => {
                *self.registry.write() = Arc::new(report.registry);
                *self.probe_failures.write() = report.failures;
                true
            }
            Err(HubError::NoReachableNodes { attempted, failures }) => {
                info!(attempted, "No reachable hubs, nothing to load");
                *self.probe_failures.write() = failures;
                false
            }
            Err(e) => {
                self.state.lock().prepare_started = false;
                return Err(e);
            }
        };

        let mut state = self.state.lock();
        state.finish_preparing(live);
        Ok(state.phase())
    }

    /// Fetch the page under the cursor from every live hub and fold it in.
    ///
    /// A no-op returning `Skipped` while preparing, loading or after the feed
    /// is exhausted.
    pub async fn load_next_page(&self) -> LoadOutcome {
        let (page, page_size) = {
            let mut state = self.state.lock();
            match state.begin_load() {
                Ok(page) => (page, state.page_size()),
                Err(phase) => {
                    debug!(?phase, "load_next_page skipped");
                    return LoadOutcome::Skipped { phase };
                }
            }
        };

        let mut guard = InFlightGuard {
            state: &self.state,
            armed: true,
        };

        let registry = self.registry();
        let outcome = fetch_page(&self.client, &registry, page, page_size, &self.defaults).await;

        guard.armed = false;
        let summary = self.state.lock().apply_page(outcome);

        if summary.has_more {
            info!(page, added = summary.added, "Loaded page");
        } else {
            info!(page, added = summary.added, "Loaded final page, feed exhausted");
        }
        LoadOutcome::Loaded(summary)
    }

    pub fn phase(&self) -> FeedPhase {
        self.state.lock().phase()
    }

    pub fn cursor(&self) -> u32 {
        self.state.lock().cursor()
    }

    pub fn items(&self) -> Vec<FeedItem> {
        self.state.lock().items().to_vec()
    }

    pub fn registry(&self) -> Arc<NodeRegistry> {
        self.registry.read().clone()
    }

    pub fn probe_failures(&self) -> Vec<NodeFailure> {
        self.probe_failures.read().clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock();
        FeedSnapshot {
            phase: state.phase(),
            cursor: state.cursor(),
            page_size: state.page_size(),
            items: state.items().to_vec(),
            node_stats: state
                .node_stats
                .iter()
                .map(|(node, stats)| (node.clone(), stats.clone()))
                .collect(),
            probe_failures: self.probe_failures(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, ts: i64, server: &str) -> FeedItem {
        FeedItem {
            id,
            created_ts: ts,
            server_url: server.to_string(),
            ..Default::default()
        }
    }

    fn outcome(page: u32, items: Vec<FeedItem>, has_more: bool) -> PageOutcome {
        PageOutcome {
            page,
            items,
            has_more,
            failures: vec![],
        }
    }

    fn ready_state() -> FeedState {
        let mut state = FeedState::new(3, 0);
        state.finish_preparing(true);
        state
    }

    #[test]
    fn test_new_state_is_preparing() {
        let mut state = FeedState::new(3, 0);
        assert_eq!(state.phase(), FeedPhase::Preparing);
        assert_eq!(state.begin_load(), Err(FeedPhase::Preparing));
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_no_live_hubs_is_no_data() {
        let mut state = FeedState::new(3, 0);
        state.finish_preparing(false);
        assert_eq!(state.phase(), FeedPhase::NoData);
        assert_eq!(state.begin_load(), Err(FeedPhase::NoData));
    }

    #[test]
    fn test_begin_load_guards_reentry() {
        let mut state = ready_state();
        assert_eq!(state.begin_load(), Ok(0));
        assert_eq!(state.phase(), FeedPhase::Loading);
        assert_eq!(state.begin_load(), Err(FeedPhase::Loading));
        // Cursor does not move while in flight
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_apply_page_resorts_whole_feed() {
        let mut state = ready_state();

        state.begin_load().unwrap();
        state.apply_page(outcome(
            0,
            vec![item(1, 100, "https://a.example"), item(2, 50, "https://a.example")],
            true,
        ));

        state.begin_load().unwrap();
        let summary = state.apply_page(outcome(
            1,
            vec![item(3, 70, "https://b.example")],
            true,
        ));

        assert_eq!(summary.added, 1);
        let ids: Vec<u64> = state.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(state.cursor(), 2);
        assert_eq!(state.phase(), FeedPhase::Ready);
    }

    #[test]
    fn test_exhaustion_latches() {
        let mut state = ready_state();
        state.begin_load().unwrap();
        state.apply_page(outcome(0, vec![], false));
        assert_eq!(state.phase(), FeedPhase::Exhausted);
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.begin_load(), Err(FeedPhase::Exhausted));

        // A late "more" signal cannot revive the feed
        state.apply_page(outcome(1, vec![], true));
        assert_eq!(state.phase(), FeedPhase::Exhausted);
    }

    #[test]
    fn test_node_stats_count_items_and_failures() {
        let mut state = ready_state();
        state.begin_load().unwrap();
        state.apply_page(PageOutcome {
            page: 0,
            items: vec![
                item(1, 10, "https://a.example"),
                item(2, 20, "https://a.example"),
            ],
            has_more: true,
            failures: vec![NodeFailure {
                node: "https://b.example".into(),
                reason: "timeout".into(),
            }],
        });

        assert_eq!(state.node_stats["https://a.example"].items, 2);
        assert_eq!(state.node_stats["https://b.example"].failed_pages, 1);
    }

    #[test]
    fn test_abort_load_keeps_cursor() {
        let mut state = ready_state();
        state.begin_load().unwrap();
        state.abort_load();
        assert_eq!(state.phase(), FeedPhase::Ready);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_first_page_offset() {
        let mut state = FeedState::new(5, 1);
        state.finish_preparing(true);
        assert_eq!(state.begin_load(), Ok(1));
    }

    #[tokio::test]
    async fn test_load_before_prepare_is_skipped() {
        let config = HubConfig {
            hubs: vec![crate::models::HubEntry::Url("https://a.example".into())],
            ..Default::default()
        };
        let session = FeedSession::new(&config).unwrap();
        assert!(matches!(
            session.load_next_page().await,
            LoadOutcome::Skipped {
                phase: FeedPhase::Preparing
            }
        ));
        assert!(session.items().is_empty());
        assert_eq!(session.cursor(), 0);
    }
}
