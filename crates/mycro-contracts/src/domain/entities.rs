//! # Core Domain Entities
//!
//! Contract interfaces, transactions, and deployment bookkeeping.

use crate::domain::abi::{AbiValue, Constructor, Function, JsonAbi, PreparedCall};
use crate::domain::invariants::check_interface_well_formed;
use crate::domain::value_objects::{Address, Bytes, NetworkId, TxHash, U256};
use crate::errors::InterfaceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CONTRACT INTERFACE
// =============================================================================

/// Where a contract was deployed on one network, as recorded by the build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeployment {
    /// Deployed address.
    pub address: Address,
    /// Hash of the deployment transaction, if the artifact recorded it.
    #[serde(
        rename = "transactionHash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_hash: Option<TxHash>,
}

/// Immutable description of a contract's callable surface.
///
/// Deserializes from a compiled build artifact:
///
/// ```json
/// { "contractName": "BaseDao", "abi": [...], "bytecode": "0x6080...",
///   "networks": { "5777": { "address": "0x..." } } }
/// ```
///
/// Unknown artifact fields (`sourceMap`, `ast`, `compiler`, ...) are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractInterface {
    /// Contract name as emitted by the compiler.
    #[serde(rename = "contractName")]
    pub name: String,
    /// JSON ABI.
    pub abi: JsonAbi,
    /// Creation bytecode.
    #[serde(default)]
    pub bytecode: Bytes,
    /// Known deployments keyed by network id.
    #[serde(default)]
    pub networks: HashMap<NetworkId, NetworkDeployment>,
}

impl ContractInterface {
    /// Creates an interface with no recorded deployments.
    pub fn new(name: impl Into<String>, abi: JsonAbi, bytecode: Bytes) -> Self {
        Self {
            name: name.into(),
            abi,
            bytecode,
            networks: HashMap::new(),
        }
    }

    /// Records a deployment on `network`.
    #[must_use]
    pub fn with_deployment(mut self, network: NetworkId, address: Address) -> Self {
        self.networks.insert(
            network,
            NetworkDeployment {
                address,
                transaction_hash: None,
            },
        );
        self
    }

    /// Parses a build artifact and checks that it is well formed.
    pub fn from_artifact_json(json: &str) -> Result<Self, InterfaceError> {
        let interface: Self = serde_json::from_str(json).map_err(|e| InterfaceError::Artifact {
            name: artifact_name_hint(json),
            reason: e.to_string(),
        })?;
        interface.validate()?;
        Ok(interface)
    }

    /// Non-empty ABI and non-empty bytecode.
    pub fn validate(&self) -> Result<(), InterfaceError> {
        check_interface_well_formed(self)
    }

    /// Every overload of the function `name`.
    #[must_use]
    pub fn functions(&self, name: &str) -> &[Function] {
        self.abi.function(name).map_or(&[], Vec::as_slice)
    }

    /// The constructor, if declared.
    #[must_use]
    pub fn constructor(&self) -> Option<&Constructor> {
        self.abi.constructor.as_ref()
    }

    /// Selects the overload of `method` that accepts `args`.
    pub fn prepare_call(
        &self,
        method: &str,
        args: &[AbiValue],
    ) -> Result<PreparedCall<'_>, InterfaceError> {
        PreparedCall::new(&self.name, &self.abi, method, args)
    }

    /// Address recorded for `network`, if any.
    #[must_use]
    pub fn address_on(&self, network: &NetworkId) -> Option<Address> {
        self.networks.get(network).map(|d| d.address)
    }
}

fn artifact_name_hint(json: &str) -> String {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| v.get("contractName")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "<unknown>".to_string())
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// A read-only call against a deployed contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// Caller, if any.
    pub from: Option<Address>,
    /// Contract being called.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Bytes,
}

/// A state-changing transaction submitted through the node's wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sending account.
    pub from: Address,
    /// Recipient, `None` for contract creation.
    pub to: Option<Address>,
    /// Calldata, or creation bytecode plus constructor arguments.
    pub data: Bytes,
    /// Value in wei.
    pub value: U256,
    /// Explicit gas limit; the node estimates when absent.
    pub gas: Option<u64>,
}

impl TransactionRequest {
    /// A contract creation transaction.
    #[must_use]
    pub fn deployment(from: Address, data: Bytes, gas: Option<u64>) -> Self {
        Self {
            from,
            to: None,
            data,
            value: U256::zero(),
            gas,
        }
    }

    /// Returns true if this is a contract creation transaction.
    #[must_use]
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// Outcome of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    /// Created contract, for creation transactions.
    pub contract_address: Option<Address>,
    /// False if execution reverted.
    pub status: bool,
    pub block_number: Option<u64>,
}

// =============================================================================
// DEPLOYMENT
// =============================================================================

/// Lifecycle of one Deployment Coordinator.
///
/// ```text
/// Idle -> ResolvingNetwork -> PlanningDeployment -> Deploying -> Deployed
///   \________________\_______________\__________________\-----> Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentState {
    Idle,
    ResolvingNetwork,
    PlanningDeployment,
    Deploying,
    Deployed,
    Failed,
}

impl DeploymentState {
    /// `Deployed` and `Failed` end the lifecycle.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Deployed | Self::Failed)
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ResolvingNetwork => "resolving_network",
            Self::PlanningDeployment => "planning_deployment",
            Self::Deploying => "deploying",
            Self::Deployed => "deployed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the coordinator is about to deploy, and where.
#[derive(Clone, Debug)]
pub struct DeploymentPlan {
    /// Fixed label of the target network (e.g. `test`).
    pub network_label: String,
    /// Identity reported by the node.
    pub network_id: NetworkId,
    /// Contracts to deploy, in order.
    pub contracts: Vec<Arc<ContractInterface>>,
    /// Sending account, read when deployment starts.
    pub sender: Option<Address>,
}

impl DeploymentPlan {
    /// A plan with no sender yet.
    pub fn new(
        network_label: impl Into<String>,
        network_id: NetworkId,
        contracts: Vec<Arc<ContractInterface>>,
    ) -> Self {
        Self {
            network_label: network_label.into(),
            network_id,
            contracts,
            sender: None,
        }
    }

    /// Names of the planned contracts, in order.
    #[must_use]
    pub fn contract_names(&self) -> Vec<&str> {
        self.contracts.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A contract instance published by a deployment transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub name: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub sender: Address,
}

/// Successful outcome of a coordinator run.
#[derive(Clone, Debug)]
pub struct DeploymentReport {
    pub plan: DeploymentPlan,
    /// Deployed contracts in plan order.
    pub deployed: Vec<DeployedContract>,
}

impl DeploymentReport {
    /// Address of `name`, if it was deployed.
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.deployed
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.address)
    }
}

// =============================================================================
// DYNAMIC BINDING
// =============================================================================

/// A contract whose address comes from the remote query service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicBinding {
    /// Logical name of the contract (registry key and interface).
    pub contract: String,
    /// Field queried on the remote service, e.g. `mycroDao`.
    pub query_field: String,
}

impl DynamicBinding {
    pub fn new(contract: impl Into<String>, query_field: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            query_field: query_field.into(),
        }
    }
}
