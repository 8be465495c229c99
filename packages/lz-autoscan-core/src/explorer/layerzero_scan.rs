use async_trait::async_trait;
use log::info;
use reqwest::header::USER_AGENT;
use std::sync::Arc;
use crate::{
    config::ExplorerConfig,
    extract::PayloadExtractor,
    types::{ExtractedPayload, MessagesResponse, ScanMessage},
    Error,
};
use super::{MessageSource, PayloadFetcher};

/// Client for the LayerZero Scan API and its transaction pages.
pub struct ScanClient {
    client: reqwest::Client,
    config: ExplorerConfig,
    extractor: Arc<dyn PayloadExtractor>,
}

impl ScanClient {
    pub fn new(config: ExplorerConfig, extractor: Arc<dyn PayloadExtractor>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            extractor,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.api_url.trim_end_matches('/'))
    }

    fn tx_page_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.config.scan_url.trim_end_matches('/'), tx_hash)
    }
}

#[async_trait]
impl MessageSource for ScanClient {
    async fn list_messages(&self, owner: &str) -> Result<Vec<ScanMessage>, Error> {
        let url = self.messages_url();
        info!("Fetching messages: {}?address={}&page=1&limit={}", url, owner, self.config.page_limit);

        let limit = self.config.page_limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("address", owner), ("page", "1"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let parsed: Option<MessagesResponse> = serde_json::from_str(&body)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(parsed.map(MessagesResponse::into_messages).unwrap_or_default())
    }
}

#[async_trait]
impl PayloadFetcher for ScanClient {
    async fn fetch_payload(&self, tx_hash: &str) -> Result<ExtractedPayload, Error> {
        let page = self
            .client
            .get(self.tx_page_url(tx_hash))
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Network(e.to_string()))?
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.extractor.extract(&page))
    }
}
