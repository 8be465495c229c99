pub mod config;
pub mod types;
pub mod clock;
pub mod extract;
pub mod explorer;
pub mod executor;
pub mod relayer;

pub use config::Config;
pub use types::{ScanMessage, ExecutionStatus, ExtractedPayload, ExecutionRequest, ExecutionReceipt};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Chain error: {0}")]
    Chain(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Extraction error: {0}")]
    Extraction(String),
}
