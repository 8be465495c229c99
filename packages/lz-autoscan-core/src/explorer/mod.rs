use async_trait::async_trait;
use crate::{
    types::{ExtractedPayload, ScanMessage},
    Error,
};

/// Lists in-flight messages sent by an owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn list_messages(&self, owner: &str) -> Result<Vec<ScanMessage>, Error>;
}

/// Resolves the delivery arguments of a message from its source transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    async fn fetch_payload(&self, tx_hash: &str) -> Result<ExtractedPayload, Error>;
}

pub mod layerzero_scan;

pub use layerzero_scan::ScanClient;
