use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use log::info;
use crate::{
    config::Config,
    types::{ExecutionReceipt, ExecutionRequest},
    Error,
};
use super::Executor;

sol! {
    #[sol(rpc)]
    contract LzExecutor {
        function lzReceive(
            uint32 dstEid,
            bytes32 sender,
            bytes payload,
            address executor
        ) external;
    }
}

/// Calls `lzReceive` on the executor contract from a local signing key.
pub struct EvmExecutor {
    provider: DynProvider,
    contract_address: Address,
}

impl EvmExecutor {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let signer: PrivateKeySigner = config
            .executor_private_key
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse private key: {}", e)))?;

        info!("Executor signer: {}", signer.address());

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(config.rpc_url()?)
            .erased();

        Ok(Self {
            provider,
            contract_address: config.executor_address()?,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }
}

#[async_trait]
impl Executor for EvmExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, Error> {
        let contract = LzExecutor::new(self.contract_address, self.provider.clone());

        let pending = contract
            .lzReceive(
                request.dst_eid,
                request.sender,
                request.payload.clone(),
                request.executor,
            )
            .gas(request.gas_limit)
            .send()
            .await
            .map_err(|e| Error::Chain(format!("Failed to send lzReceive: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        info!("lzReceive sent: {}", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| Error::Chain(format!("Failed to get receipt for {}: {}", tx_hash, e)))?;

        if !receipt.status() {
            return Err(Error::Chain(format!(
                "lzReceive {} reverted in block {:?}",
                tx_hash, receipt.block_number
            )));
        }

        Ok(ExecutionReceipt {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}
