//! # Error Types
//!
//! Each component surfaces its own failure to its caller. Nothing here retries.

use crate::config::ConfigError;
use crate::domain::entities::{DeployedContract, DeploymentState};
use crate::domain::value_objects::{NetworkId, TxHash};
use thiserror::Error;

// =============================================================================
// TRANSPORT ERRORS
// =============================================================================

/// Errors from the node transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP layer failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Node could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Node answered with a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response did not have the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Node or wallet refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// Transaction was mined but execution reverted.
    #[error("transaction reverted: {0:?}")]
    Reverted(TxHash),
}

// =============================================================================
// QUERY ERRORS
// =============================================================================

/// Errors from the remote query service.
#[derive(Debug, Error)]
pub enum QueryError {
    /// HTTP layer failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Service returned a non-empty `errors` array.
    #[error("query failed: {0}")]
    Query(String),

    /// Response body was not JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

// =============================================================================
// INTERFACE ERRORS
// =============================================================================

/// Problems with a contract interface or the arguments given to it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    /// Artifact could not be read or parsed.
    #[error("artifact {name}: {reason}")]
    Artifact { name: String, reason: String },

    /// No artifact is known under this name.
    #[error("no interface named {0}")]
    NotFound(String),

    /// ABI has no entries.
    #[error("{0}: ABI is empty")]
    EmptyAbi(String),

    /// No creation bytecode.
    #[error("{0}: bytecode is missing")]
    MissingBytecode(String),

    /// ABI has no function with that name.
    #[error("{contract} has no function {function}")]
    UnknownFunction { contract: String, function: String },

    /// Wrong number of arguments.
    #[error("{function}: expected {expected} arguments, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Argument does not match the parameter type.
    #[error("argument {param}: expected {expected}")]
    ArgumentType { param: String, expected: String },

    /// Integer argument does not fit the declared width.
    #[error("argument {param}: value out of range for {expected}")]
    ValueOutOfRange { param: String, expected: String },

    /// Parameter type the ABI codec cannot parse.
    #[error("unsupported ABI type: {0}")]
    UnsupportedType(String),

    /// Encoding arguments or decoding return data failed.
    #[error("ABI codec: {0}")]
    Codec(String),
}

// =============================================================================
// HANDLE ERRORS
// =============================================================================

/// Errors from calls made through a [`crate::factory::ContractHandle`].
#[derive(Debug, Error)]
pub enum HandleError {
    /// No node transport is bound.
    #[error("provider unavailable")]
    ProviderUnavailable,

    /// State-changing call with no default sender.
    #[error("{0}: no sending account selected")]
    NoSender(String),

    /// Handle has no address yet.
    #[error("{0}: handle is not bound to an address")]
    Unbound(String),

    /// Interface records no deployment on the connected network.
    #[error("{contract} is not deployed on network {network}")]
    NotDeployed { contract: String, network: NetworkId },

    /// Bad method or arguments.
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    /// Node call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// =============================================================================
// DEPLOYMENT ERRORS
// =============================================================================

/// Errors that move a Deployment Coordinator into `Failed`.
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// No node connection or no sending account.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Network-identity query failed.
    #[error("network resolution failed: {0}")]
    NetworkResolutionFailed(#[source] TransportError),

    /// A planned interface cannot be deployed.
    #[error("malformed interface: {0}")]
    MalformedInterface(#[from] InterfaceError),

    /// A deployment transaction was rejected or reverted.
    ///
    /// `deployed` lists contracts published before the failure; they stay deployed.
    #[error("deployment of {contract} failed after {} deployed: {source}", .deployed.len())]
    DeploymentFailed {
        contract: String,
        deployed: Vec<DeployedContract>,
        #[source]
        source: TransportError,
    },

    /// State machine was driven out of order.
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition {
        from: DeploymentState,
        to: DeploymentState,
    },

    /// Background task ended without producing an outcome.
    #[error("deployment task aborted: {0}")]
    Aborted(String),
}

impl DeploymentError {
    /// Contracts that were published before this error.
    #[must_use]
    pub fn deployed(&self) -> &[DeployedContract] {
        match self {
            Self::DeploymentFailed { deployed, .. } => deployed,
            _ => &[],
        }
    }
}

// =============================================================================
// RESOLUTION & REGISTRY ERRORS
// =============================================================================

/// Errors from the Dynamic Address Resolver.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Query failed or the response carried no usable address.
    #[error("address resolution failed for {field}: {reason}")]
    AddressResolutionFailed { field: String, reason: String },

    /// Resolved address could not be bound to the interface.
    #[error(transparent)]
    Binding(#[from] InterfaceError),
}

impl ResolutionError {
    pub(crate) fn failed(field: &str, reason: impl Into<String>) -> Self {
        Self::AddressResolutionFailed {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors from the Contract Registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No entry under this logical name.
    #[error("unknown contract: {0}")]
    UnknownContract(String),

    /// Dynamic entry failed to resolve.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

// =============================================================================
// SERVICE ERRORS
// =============================================================================

/// Errors while bootstrapping or using [`crate::service::ContractsService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An artifact failed to load or a handle failed to bind.
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),
}
