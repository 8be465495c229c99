use alloy::primitives::{Address, Bytes, B256};
use log::{debug, error, info, warn};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use crate::{
    clock::{Clock, TokioClock},
    config::Config,
    executor::{EvmExecutor, Executor},
    explorer::{MessageSource, PayloadFetcher, ScanClient},
    extract::HexExtractor,
    types::{ExecutionRequest, ExtractedPayload, ScanMessage},
    Error,
};

/// The subset of configuration the poll loop acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayerSettings {
    pub owner: String,
    pub dst_eid: u32,
    pub executor_address: Address,
    pub gas_limit: u64,
    pub poll_interval: Duration,
}

impl RelayerSettings {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            owner: config.owner.clone(),
            dst_eid: config.dst_eid,
            executor_address: config.executor_address()?,
            gas_limit: config.gas_limit,
            poll_interval: config.poll_interval(),
        })
    }
}

/// Resolves to true once `true` is published, or false when the sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) -> bool {
    while shutdown.changed().await.is_ok() {
        let stop = *shutdown.borrow_and_update();
        if stop {
            return true;
        }
    }
    false
}

/// Counters for one poll cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Messages returned by the explorer.
    pub fetched: usize,
    /// Messages whose executor status was WAITING.
    pub pending: usize,
    pub executed: usize,
    /// Pending messages dropped before submission (fetch error, nothing to extract).
    pub skipped: usize,
    /// Submissions that failed to broadcast, confirm, or reverted.
    pub failed: usize,
}

enum Outcome {
    Executed,
    Skipped,
    Failed,
}

pub struct Relayer {
    settings: RelayerSettings,
    source: Arc<dyn MessageSource>,
    fetcher: Arc<dyn PayloadFetcher>,
    executor: Arc<dyn Executor>,
    clock: Arc<dyn Clock>,
}

impl Relayer {
    pub fn new(
        settings: RelayerSettings,
        source: Arc<dyn MessageSource>,
        fetcher: Arc<dyn PayloadFetcher>,
        executor: Arc<dyn Executor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            source,
            fetcher,
            executor,
            clock,
        }
    }

    /// Wires the LayerZero Scan client, the EVM executor and the tokio clock.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let extractor = Arc::new(HexExtractor::new()?);
        let scan = Arc::new(ScanClient::new(config.explorer.clone(), extractor));
        let executor = Arc::new(EvmExecutor::new(config)?);
        info!("Executor contract: {}", executor.contract_address());

        Ok(Self::new(
            RelayerSettings::from_config(config)?,
            scan.clone(),
            scan,
            executor,
            Arc::new(TokioClock),
        ))
    }

    /// Polls until `shutdown` flips to true. A dropped sender never stops the loop.
    ///
    /// Shutdown is only observed between cycles; a submission waiting for its
    /// receipt always runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Worker autoscan started for owner: {}", self.settings.owner);

        loop {
            let stopped = *shutdown.borrow();
            if stopped {
                break;
            }

            self.poll_once().await;

            info!("Sleep {} ms...", self.settings.poll_interval.as_millis());
            tokio::select! {
                biased;
                true = stop_requested(&mut shutdown) => break,
                _ = self.clock.sleep(self.settings.poll_interval) => {}
            }
        }

        info!("Relayer stopped");
    }

    /// Runs a single discovery and execution pass.
    pub async fn poll_once(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let messages = match self.source.list_messages(&self.settings.owner).await {
            Ok(messages) => messages,
            Err(e) => {
                error!("API error: {}", e);
                Vec::new()
            }
        };

        report.fetched = messages.len();
        if messages.is_empty() {
            info!("No messages found");
            return report;
        }
        info!("Found {} messages.", messages.len());

        for message in messages.iter() {
            if !message.is_waiting() {
                match message.status() {
                    Some(status) => debug!("Skipping {} with executor status {}", message.src_tx_hash, status),
                    None => debug!("Skipping {} without executor result", message.src_tx_hash),
                }
                continue;
            }

            report.pending += 1;
            info!("Pending executor message found: {}", message.src_tx_hash);

            match self.execute_message(message).await {
                Outcome::Executed => report.executed += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        report
    }

    async fn execute_message(&self, message: &ScanMessage) -> Outcome {
        let tx_hash = message.src_tx_hash.as_str();
        if tx_hash.is_empty() {
            warn!("Pending message has no source transaction hash, skipping");
            return Outcome::Skipped;
        }
        info!("=== EXECUTING message from tx: {}", tx_hash);

        let extracted = match self.fetcher.fetch_payload(tx_hash).await {
            Ok(extracted) => extracted,
            Err(e) => {
                error!("fetchPayload error for {}: {}", tx_hash, e);
                return Outcome::Skipped;
            }
        };

        if !extracted.is_complete() {
            warn!("Cannot extract payload/sender for {}", tx_hash);
            return Outcome::Skipped;
        }

        if let Some(sender) = &extracted.sender32 {
            info!(" sender32: {}", sender);
        }
        if let Some(len) = extracted.payload_len_bytes() {
            info!(" payload length: {} bytes", len);
        }

        let request = match self.build_request(&extracted) {
            Ok(request) => request,
            Err(e) => {
                warn!("Cannot build lzReceive call for {}: {}", tx_hash, e);
                return Outcome::Skipped;
            }
        };

        match self.executor.execute(&request).await {
            Ok(receipt) => {
                match receipt.block_number {
                    Some(block) => info!("EXECUTED {} at block {}", receipt.tx_hash, block),
                    None => info!("EXECUTED {} (block unknown)", receipt.tx_hash),
                }
                Outcome::Executed
            }
            Err(e) => {
                error!("Execution error for {}: {}", tx_hash, e);
                Outcome::Failed
            }
        }
    }

    fn build_request(&self, extracted: &ExtractedPayload) -> Result<ExecutionRequest, Error> {
        let (Some(sender), Some(payload)) = (&extracted.sender32, &extracted.payload) else {
            return Err(Error::Extraction("sender32 or payload missing".to_string()));
        };

        let sender = B256::from_str(sender)
            .map_err(|e| Error::Extraction(format!("Invalid sender32 {}: {}", sender, e)))?;
        let payload = hex::decode(payload.trim_start_matches("0x"))
            .map_err(|e| Error::Extraction(format!("Invalid payload hex: {}", e)))?;

        Ok(ExecutionRequest {
            dst_eid: self.settings.dst_eid,
            sender,
            payload: Bytes::from(payload),
            executor: self.settings.executor_address,
            gas_limit: self.settings.gas_limit,
        })
    }
}
