pub mod aggregator;
pub mod client;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod extension;
pub mod feed;
pub mod models;
pub mod prober;
pub mod tracing_setup;

pub use aggregator::{fetch_page, merge_batches, NodeBatch, OriginDefaults, PageOutcome};
pub use client::HubClient;
pub use config::HubConfig;
pub use directory::DirectorySource;
pub use error::{HubError, NodeFailure};
pub use feed::{FeedPhase, FeedSession, FeedSnapshot, LoadOutcome};
pub use models::{FeedItem, HubEntry, NodeIdentity, NodeMetadata};
pub use prober::{probe, NodeRegistry, ProbeReport};
