//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the coordinator depends on. Adapters implement these traits to
//! provide:
//! - A node transport (JSON-RPC node, or the in-memory node in tests)
//! - The currently selected wallet account
//! - The remote address query service
//! - Compiled contract artifacts

use crate::domain::entities::{
    CallRequest, ContractInterface, TransactionReceipt, TransactionRequest,
};
use crate::domain::value_objects::{Address, Bytes, NetworkId, TxHash};
use crate::errors::{InterfaceError, QueryError, TransportError};
use async_trait::async_trait;

// =============================================================================
// NODE TRANSPORT
// =============================================================================

/// Outbound calls to a blockchain node.
///
/// Treated as an opaque capability: read calls, state-changing transactions,
/// and a network-identity query.
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Identity of the network the node is connected to.
    async fn network_id(&self) -> Result<NetworkId, TransportError>;

    /// Executes a read-only call at the latest block.
    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError>;

    /// Submits a transaction for signing and broadcast.
    ///
    /// # Returns
    ///
    /// * `TxHash` - once the node accepted it; it may not be mined yet
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, TransportError>;

    /// Waits until `tx_hash` is mined. No timeout: runs until a receipt or an error.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, TransportError>;
}

// =============================================================================
// ACCOUNT SOURCE
// =============================================================================

/// The wallet account currently selected by the user.
///
/// Shared mutable external state: the user may switch accounts at any time,
/// so implementations must return the live value on every call.
pub trait AccountSource: Send + Sync {
    /// The selected account, or `None` when the wallet is locked or absent.
    fn selected_account(&self) -> Option<Address>;
}

// =============================================================================
// ADDRESS QUERY SERVICE
// =============================================================================

/// Remote structured query service.
///
/// A request carries nothing but the field name; the response is returned
/// verbatim, shaped `{ "data": { "<field>": <value> } }`.
#[async_trait]
pub trait AddressQueryService: Send + Sync {
    /// Runs the parameterless query `query{ <field> }`.
    async fn query(&self, field: &str) -> Result<serde_json::Value, QueryError>;
}

// =============================================================================
// ARTIFACT SOURCE
// =============================================================================

/// Compiled contract artifacts produced by a separate build step.
pub trait ArtifactSource: Send + Sync {
    /// Loads and validates the artifact stored under `artifact`.
    fn load(&self, artifact: &str) -> Result<ContractInterface, InterfaceError>;
}
