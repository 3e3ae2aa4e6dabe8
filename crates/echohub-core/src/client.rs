//! HTTP client for the hub directory and individual hubs.
//!
//! Every call goes through the `{code, msg, data}` envelope; a non-2xx
//! status, a non-success code and an unparseable body all surface as
//! `HubError`.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::constants::{CONNECT_PATH, ECHO_PAGE_PATH};
use crate::error::HubError;
use crate::models::{
    ApiResponse, FeedItem, HubEntry, NodeIdentity, NodeMetadata, PageRequest, PaginationResult,
};

#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
}

impl HubClient {
    pub fn new(timeout: Duration) -> Result<Self, HubError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch the raw hub list from a directory source
    pub async fn fetch_directory(&self, source_url: &str) -> Result<Vec<HubEntry>, HubError> {
        let response = self.client.get(source_url).send().await?;
        decode_envelope(response).await
    }

    /// Probe a hub's connect endpoint
    pub async fn connect(&self, node: &NodeIdentity) -> Result<NodeMetadata, HubError> {
        let response = self.client.get(node.endpoint(CONNECT_PATH)).send().await?;
        decode_envelope(response).await
    }

    /// Query one page of a hub's echo feed
    pub async fn echo_page(
        &self,
        node: &NodeIdentity,
        request: PageRequest,
    ) -> Result<PaginationResult<FeedItem>, HubError> {
        let response = self
            .client
            .post(node.endpoint(ECHO_PAGE_PATH))
            .json(&request)
            .send()
            .await?;
        decode_envelope(response).await
    }
}

async fn decode_envelope<T: DeserializeOwned>(response: Response) -> Result<T, HubError> {
    let response = response.error_for_status()?;
    let envelope: ApiResponse<T> = response.json().await?;
    envelope.into_data()
}
