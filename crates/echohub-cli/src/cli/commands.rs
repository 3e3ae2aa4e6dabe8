use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use echohub_core::aggregator::{fetch_page, OriginDefaults};
use echohub_core::{
    probe, DirectorySource, FeedPhase, FeedSession, HubClient, HubConfig, HubError, LoadOutcome,
    NodeFailure, NodeIdentity, NodeMetadata,
};

use super::output::print_json;

#[derive(Debug, Clone)]
pub enum CliCommand {
    /// Resolve the directory and probe every hub
    Hubs,
    /// Fan out a single page
    Page { page: u32 },
    /// Load pages until exhausted or `max_pages` is reached
    Feed { max_pages: Option<u32> },
}

/// Flag values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub directory: Option<String>,
    pub page_size: Option<usize>,
}

pub fn apply_overrides(mut config: HubConfig, overrides: &Overrides) -> HubConfig {
    if let Some(ref directory) = overrides.directory {
        config.directory_source = Some(directory.clone());
    }
    if let Some(page_size) = overrides.page_size {
        config.page_size = page_size;
    }
    config
}

#[derive(Debug, Serialize)]
struct HubInfo<'a> {
    node: &'a NodeIdentity,
    metadata: &'a NodeMetadata,
}

#[derive(Debug, Serialize)]
struct HubsReport<'a> {
    hubs: Vec<HubInfo<'a>>,
    failures: &'a [NodeFailure],
}

pub async fn run(command: CliCommand, config: HubConfig, pretty: bool) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    match command {
        CliCommand::Hubs => run_hubs(&config, pretty).await,
        CliCommand::Page { page } => run_page(&config, page, pretty).await,
        CliCommand::Feed { max_pages } => run_feed(&config, max_pages, pretty).await,
    }
}

async fn run_hubs(config: &HubConfig, pretty: bool) -> Result<()> {
    let client = HubClient::new(config.request_timeout())?;
    let nodes = DirectorySource::from_config(config)
        .resolve(&client)
        .await
        .context("Failed to resolve hub directory")?;

    match probe(&client, &nodes).await {
        Ok(report) => {
            let hubs = report
                .registry
                .iter()
                .map(|(node, metadata)| HubInfo { node, metadata })
                .collect();
            print_json(
                &HubsReport {
                    hubs,
                    failures: &report.failures,
                },
                pretty,
            )
        }
        Err(HubError::NoReachableNodes { failures, .. }) => print_json(
            &HubsReport {
                hubs: Vec::new(),
                failures: &failures,
            },
            pretty,
        ),
        Err(e) => Err(e).context("Failed to probe hubs"),
    }
}

async fn run_page(config: &HubConfig, page: u32, pretty: bool) -> Result<()> {
    let client = HubClient::new(config.request_timeout())?;
    let nodes = DirectorySource::from_config(config)
        .resolve(&client)
        .await
        .context("Failed to resolve hub directory")?;
    let report = probe(&client, &nodes)
        .await
        .context("Failed to probe hubs")?;

    let outcome = fetch_page(
        &client,
        &report.registry,
        page,
        config.page_size,
        &OriginDefaults::from(config),
    )
    .await;
    print_json(&outcome, pretty)
}

async fn run_feed(config: &HubConfig, max_pages: Option<u32>, pretty: bool) -> Result<()> {
    let session = FeedSession::new(config)?;
    let phase = session
        .prepare()
        .await
        .context("Failed to prepare feed")?;

    if phase == FeedPhase::NoData {
        info!("No reachable hubs");
    }

    let mut loaded = 0u32;
    while max_pages.map_or(true, |max| loaded < max) {
        match session.load_next_page().await {
            LoadOutcome::Loaded(_) => loaded += 1,
            LoadOutcome::Skipped { .. } => break,
        }
    }

    print_json(&session.snapshot(), pretty)
}
