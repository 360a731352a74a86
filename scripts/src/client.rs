//! The chain operations the deploy scripts perform

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::SolCall,
};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{errors::ScriptError, utils::Wallet};

/// A client able to deploy contracts, send transactions and read state
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Send a creation transaction with the given code, returning the address
    /// of the new contract
    async fn deploy(&self, name: &str, code: Bytes) -> Result<Address, ScriptError>;

    /// Send a transaction to `to` and wait for it to succeed
    async fn send(&self, to: Address, data: Bytes) -> Result<(), ScriptError>;

    /// Execute a read-only call against `to`
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ScriptError>;
}

/// Send a contract call as a transaction
pub async fn send_call<Ch, C>(client: &Ch, to: Address, call: C) -> Result<(), ScriptError>
where
    Ch: ChainClient + ?Sized,
    C: SolCall,
{
    debug!("Sending {} to {to}", C::SIGNATURE);
    client.send(to, call.abi_encode().into()).await
}

/// Execute a read-only contract call and decode its return value
pub async fn read_call<Ch, C>(client: &Ch, to: Address, call: C) -> Result<C::Return, ScriptError>
where
    Ch: ChainClient + ?Sized,
    C: SolCall,
{
    let ret = client.call(to, call.abi_encode().into()).await?;
    C::abi_decode_returns(&ret)
        .map_err(|e| ScriptError::ContractInteraction(format!("{} on {to}: {e}", C::SIGNATURE)))
}

/// A [`ChainClient`] over an alloy provider signing with the deployer's key
#[derive(Clone)]
pub struct AlloyClient {
    provider: Wallet,
}

impl AlloyClient {
    pub fn new(provider: Wallet) -> Self {
        Self { provider }
    }

    /// Send a transaction and wait for a successful receipt
    async fn send_and_confirm(
        &self,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, String> {
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| e.to_string())?
            .get_receipt()
            .await
            .map_err(|e| e.to_string())?;

        if !receipt.status() {
            return Err(format!("transaction {:#x} reverted", receipt.transaction_hash));
        }

        debug!("Transaction {:#x} succeeded", receipt.transaction_hash);
        Ok(receipt)
    }
}

#[async_trait]
impl ChainClient for AlloyClient {
    async fn deploy(&self, name: &str, code: Bytes) -> Result<Address, ScriptError> {
        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = self
            .send_and_confirm(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{name}: {e}")))?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("{name}: receipt has no contract address"))
        })?;

        info!("Deployed {name} at {address}");
        Ok(address)
    }

    async fn send(&self, to: Address, data: Bytes) -> Result<(), ScriptError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.send_and_confirm(tx)
            .await
            .map(|_| ())
            .map_err(|e| ScriptError::ContractInteraction(format!("{to}: {e}")))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ScriptError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider
            .call(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(format!("call to {to}: {e}")))
    }
}
