use async_trait::async_trait;
use crate::{
    types::{ExecutionReceipt, ExecutionRequest},
    Error,
};

/// Submits a delivery on the destination chain and waits for it to be mined.
///
/// Implementations assume the request is complete; no replay protection is
/// applied here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, Error>;
}

pub mod evm;

pub use evm::EvmExecutor;
