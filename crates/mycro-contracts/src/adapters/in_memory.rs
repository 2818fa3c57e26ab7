//! # In-Memory Adapters
//!
//! Node, query service and artifact store that live entirely in memory.
//! Used by unit and integration tests and for local runs without a node.
//!
//! `InMemoryNode` records every port call in order so tests can assert on the
//! sequence the coordinator produced, and can be told to fail the network
//! query or to reject/revert specific deployments.

use crate::domain::entities::{
    CallRequest, ContractInterface, TransactionReceipt, TransactionRequest,
};
use crate::domain::services::{compute_contract_address, keccak256};
use crate::domain::value_objects::{Address, Bytes, NetworkId, TxHash};
use crate::errors::{InterfaceError, QueryError, TransportError};
use crate::ports::outbound::{AddressQueryService, ArtifactSource, NodeTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// IN-MEMORY NODE
// =============================================================================

/// A port call observed by [`InMemoryNode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeCall {
    NetworkId,
    Call { to: Address },
    SendTransaction { from: Address, to: Option<Address> },
    WaitForReceipt(TxHash),
}

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct NodeState {
    log: Vec<NodeCall>,
    nonces: HashMap<Address, u64>,
    creations: usize,
    block: u64,
    code: HashMap<Address, Bytes>,
    deployments: Vec<Address>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    sent: Vec<TransactionRequest>,
    call_results: HashMap<Address, Bytes>,
}

/// Deterministic in-memory node.
///
/// Contract creations land at the standard CREATE address of the sender and
/// its per-sender nonce.
pub struct InMemoryNode {
    network_id: NetworkId,
    network_failure: Option<String>,
    rejected: HashSet<usize>,
    reverted: HashSet<usize>,
    network_hook: Option<Hook>,
    state: Mutex<NodeState>,
}

impl InMemoryNode {
    /// A node on `network`.
    pub fn new(network: u64) -> Self {
        Self {
            network_id: NetworkId::from(network),
            network_failure: None,
            rejected: HashSet::new(),
            reverted: HashSet::new(),
            network_hook: None,
            state: Mutex::new(NodeState::default()),
        }
    }

    /// Makes `network_id()` fail.
    #[must_use]
    pub fn failing_network_id(mut self, reason: impl Into<String>) -> Self {
        self.network_failure = Some(reason.into());
        self
    }

    /// Rejects the `ordinal`-th contract creation (0-based) at submission.
    #[must_use]
    pub fn rejecting_deployment(mut self, ordinal: usize) -> Self {
        self.rejected.insert(ordinal);
        self
    }

    /// Mines the `ordinal`-th contract creation (0-based) with a failed status.
    #[must_use]
    pub fn reverting_deployment(mut self, ordinal: usize) -> Self {
        self.reverted.insert(ordinal);
        self
    }

    /// Runs `hook` inside every `network_id()` call, before it answers.
    #[must_use]
    pub fn on_network_id(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.network_hook = Some(Box::new(hook));
        self
    }

    /// Return data for calls to `address`.
    pub fn set_call_result(&self, address: Address, data: Vec<u8>) {
        self.state.lock().call_results.insert(address, Bytes::from(data));
    }

    /// Every port call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<NodeCall> {
        self.state.lock().log.clone()
    }

    /// Accepted transactions, in order.
    #[must_use]
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().sent.clone()
    }

    /// Addresses of successfully created contracts, in order.
    #[must_use]
    pub fn deployments(&self) -> Vec<Address> {
        self.state.lock().deployments.clone()
    }

    /// Code stored at `address`.
    #[must_use]
    pub fn code_at(&self, address: Address) -> Option<Bytes> {
        self.state.lock().code.get(&address).cloned()
    }
}

fn tx_hash(from: Address, nonce: u64) -> TxHash {
    let mut preimage = from.as_bytes().to_vec();
    preimage.extend_from_slice(&nonce.to_be_bytes());
    TxHash::new(keccak256(&preimage))
}

#[async_trait]
impl NodeTransport for InMemoryNode {
    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        self.state.lock().log.push(NodeCall::NetworkId);
        if let Some(hook) = &self.network_hook {
            hook();
        }
        match &self.network_failure {
            Some(reason) => Err(TransportError::Connection(reason.clone())),
            None => Ok(self.network_id.clone()),
        }
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError> {
        let mut state = self.state.lock();
        state.log.push(NodeCall::Call { to: request.to });
        Ok(state.call_results.get(&request.to).cloned().unwrap_or_default())
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TxHash, TransportError> {
        let mut state = self.state.lock();
        state.log.push(NodeCall::SendTransaction {
            from: request.from,
            to: request.to,
        });

        let ordinal = if request.is_contract_creation() {
            let ordinal = state.creations;
            state.creations += 1;
            if self.rejected.contains(&ordinal) {
                return Err(TransportError::Rejected(format!(
                    "contract creation #{ordinal} rejected"
                )));
            }
            Some(ordinal)
        } else {
            None
        };

        let nonce = {
            let entry = state.nonces.entry(request.from).or_insert(0);
            let current = *entry;
            *entry += 1;
            current
        };
        let hash = tx_hash(request.from, nonce);
        state.block += 1;

        let (status, contract_address) = match ordinal {
            Some(ordinal) if self.reverted.contains(&ordinal) => (false, None),
            Some(_) => {
                let address = compute_contract_address(request.from, nonce);
                state.code.insert(address, request.data.clone());
                state.deployments.push(address);
                (true, Some(address))
            }
            None => (true, None),
        };

        let receipt = TransactionReceipt {
            transaction_hash: hash,
            contract_address,
            status,
            block_number: Some(state.block),
        };
        state.receipts.insert(hash, receipt);
        state.sent.push(request);
        Ok(hash)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt, TransportError> {
        let mut state = self.state.lock();
        state.log.push(NodeCall::WaitForReceipt(tx_hash));
        state
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| TransportError::Parse(format!("unknown transaction {tx_hash}")))
    }
}

// =============================================================================
// STATIC QUERY SERVICE
// =============================================================================

/// Query service answering every query with a fixed response.
pub struct StaticQueryService {
    response: Mutex<Result<serde_json::Value, String>>,
    invocations: AtomicUsize,
}

impl StaticQueryService {
    /// Answers with `response` verbatim.
    #[must_use]
    pub fn new(response: serde_json::Value) -> Self {
        Self {
            response: Mutex::new(Ok(response)),
            invocations: AtomicUsize::new(0),
        }
    }

    /// Answers `{ "data": { field: address } }`.
    #[must_use]
    pub fn with_address(field: &str, address: &str) -> Self {
        Self::new(serde_json::json!({ "data": { field: address } }))
    }

    /// Fails every query.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(Err(reason.into())),
            invocations: AtomicUsize::new(0),
        }
    }

    /// Replaces the response for subsequent queries.
    pub fn set_response(&self, response: serde_json::Value) {
        *self.response.lock() = Ok(response);
    }

    /// Number of queries served so far.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressQueryService for StaticQueryService {
    async fn query(&self, _field: &str) -> Result<serde_json::Value, QueryError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .clone()
            .map_err(QueryError::Connection)
    }
}

// =============================================================================
// IN-MEMORY ARTIFACTS
// =============================================================================

/// Artifact store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryArtifacts {
    artifacts: HashMap<String, ContractInterface>,
}

impl InMemoryArtifacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `interface` under `artifact`.
    #[must_use]
    pub fn with(mut self, artifact: impl Into<String>, interface: ContractInterface) -> Self {
        self.artifacts.insert(artifact.into(), interface);
        self
    }
}

impl ArtifactSource for InMemoryArtifacts {
    fn load(&self, artifact: &str) -> Result<ContractInterface, InterfaceError> {
        let interface = self
            .artifacts
            .get(artifact)
            .cloned()
            .ok_or_else(|| InterfaceError::NotFound(artifact.to_string()))?;
        interface.validate()?;
        Ok(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation(from: Address) -> TransactionRequest {
        TransactionRequest::deployment(from, Bytes::from(vec![0x60, 0x80]), None)
    }

    #[tokio::test]
    async fn test_creation_lands_at_create_address() {
        let node = InMemoryNode::new(5777);
        let from = Address::new([1; 20]);

        let hash = node.send_transaction(creation(from)).await.unwrap();
        let receipt = node.wait_for_receipt(hash).await.unwrap();

        assert!(receipt.status);
        assert_eq!(receipt.contract_address, Some(compute_contract_address(from, 0)));
        assert_eq!(node.deployments(), vec![compute_contract_address(from, 0)]);
        assert!(node.code_at(compute_contract_address(from, 0)).is_some());
    }

    #[tokio::test]
    async fn test_rejected_creation_consumes_no_nonce() {
        let node = InMemoryNode::new(5777).rejecting_deployment(0);
        let from = Address::new([1; 20]);

        let err = node.send_transaction(creation(from)).await.unwrap_err();
        assert!(matches!(err, TransportError::Rejected(_)));

        let hash = node.send_transaction(creation(from)).await.unwrap();
        let receipt = node.wait_for_receipt(hash).await.unwrap();
        assert_eq!(receipt.contract_address, Some(compute_contract_address(from, 0)));
    }

    #[tokio::test]
    async fn test_reverted_creation_has_failed_status() {
        let node = InMemoryNode::new(5777).reverting_deployment(0);
        let hash = node.send_transaction(creation(Address::new([1; 20]))).await.unwrap();
        let receipt = node.wait_for_receipt(hash).await.unwrap();
        assert!(!receipt.status);
        assert!(node.deployments().is_empty());
    }

    #[tokio::test]
    async fn test_call_log_order() {
        let node = InMemoryNode::new(1);
        let to = Address::new([9; 20]);
        node.network_id().await.unwrap();
        node.call(CallRequest {
            from: None,
            to,
            data: Bytes::new(),
        })
        .await
        .unwrap();
        assert_eq!(node.calls(), vec![NodeCall::NetworkId, NodeCall::Call { to }]);
    }

    #[tokio::test]
    async fn test_failing_network_id() {
        let node = InMemoryNode::new(1).failing_network_id("node offline");
        assert!(matches!(
            node.network_id().await,
            Err(TransportError::Connection(ref r)) if r == "node offline"
        ));
    }

    #[tokio::test]
    async fn test_static_query_counts_invocations() {
        let service = StaticQueryService::with_address("mycroDao", "0x01");
        service.query("mycroDao").await.unwrap();
        service.query("mycroDao").await.unwrap();
        assert_eq!(service.invocations(), 2);
    }

    #[test]
    fn test_in_memory_artifacts_not_found() {
        let store = InMemoryArtifacts::new();
        assert_eq!(
            store.load("BaseDao.json").unwrap_err(),
            InterfaceError::NotFound("BaseDao.json".to_string())
        );
    }
}
