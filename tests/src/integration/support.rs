//! Shared fixtures for the integration flows.

use async_trait::async_trait;
use mycro_contracts::adapters::{InMemoryArtifacts, InMemoryNode};
use mycro_contracts::domain::entities::{CallRequest, TransactionRequest};
use mycro_contracts::errors::TransportError;
use mycro_contracts::prelude::*;
use std::sync::Arc;
use tokio::sync::Notify;

pub const ALICE: Address = Address::new([0xa1; 20]);
pub const BOB: Address = Address::new([0xb0; 20]);
pub const DAO: &str = "0xabc0000000000000000000000000000000000abc";

/// Node whose `network_id` blocks until [`GatedNode::release`] is called.
pub struct GatedNode {
    inner: Arc<InMemoryNode>,
    gate: Notify,
}

impl GatedNode {
    pub fn new(inner: Arc<InMemoryNode>) -> Self {
        Self {
            inner,
            gate: Notify::new(),
        }
    }

    /// Lets a pending (or the next) network query through.
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl NodeTransport for GatedNode {
    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        self.gate.notified().await;
        self.inner.network_id().await
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError> {
        self.inner.call(request).await
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TxHash, TransportError> {
        self.inner.send_transaction(request).await
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt, TransportError> {
        self.inner.wait_for_receipt(tx_hash).await
    }
}

/// An artifact with a constructor, a view and a state-changing function.
pub fn artifact(name: &str) -> ContractInterface {
    ContractInterface::new(
        name,
        JsonAbi::parse([
            "constructor()",
            "function owner() view returns (address)",
            "function vote(bool yes)",
        ])
        .unwrap(),
        Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]),
    )
}

/// Truffle-style JSON for [`artifact`].
pub fn artifact_json(name: &str) -> String {
    serde_json::json!({
        "contractName": name,
        "abi": [
            { "type": "constructor", "inputs": [] },
            {
                "type": "function",
                "name": "owner",
                "inputs": [],
                "outputs": [{ "name": "", "type": "address" }],
                "stateMutability": "view"
            },
            {
                "type": "function",
                "name": "vote",
                "inputs": [{ "name": "yes", "type": "bool" }],
                "outputs": [],
                "stateMutability": "nonpayable"
            }
        ],
        "bytecode": "0x6080604052",
        "networks": {}
    })
    .to_string()
}

/// The four stock artifacts, in memory.
pub fn stock_artifacts() -> InMemoryArtifacts {
    InMemoryArtifacts::new()
        .with("MycroCoin.json", artifact("MycroCoin"))
        .with("BaseDao.json", artifact("BaseDao"))
        .with("MergeASC.json", artifact("MergeASC"))
        .with("MergeModule.json", artifact("MergeModule"))
}
