//! # Deployment Executor
//!
//! Sends one contract-creation transaction and waits for it to be mined.
//! Shared by the coordinator (sender snapshotted at `Deploying`) and by
//! [`deploy_contract`] (sender read at call time).

use crate::domain::abi::{encode_constructor, AbiValue};
use crate::domain::entities::{ContractInterface, DeployedContract, TransactionRequest};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::{DeploymentError, InterfaceError, TransportError};
use crate::ports::outbound::NodeTransport;
use crate::provider::ProviderBinding;
use tracing::{info, instrument};

/// Creation bytecode followed by the ABI-encoded constructor arguments.
pub fn creation_data(
    interface: &ContractInterface,
    args: &[AbiValue],
) -> Result<Bytes, InterfaceError> {
    let mut data = interface.bytecode.as_slice().to_vec();
    match interface.constructor() {
        Some(constructor) => {
            data.extend(encode_constructor(&interface.name, constructor, args)?);
        }
        None if !args.is_empty() => {
            return Err(InterfaceError::ArgumentCount {
                function: interface.name.clone(),
                expected: 0,
                actual: args.len(),
            });
        }
        None => {}
    }
    Ok(Bytes::from(data))
}

/// Submits a creation transaction from `sender` and waits for its receipt.
pub(crate) async fn submit_creation(
    transport: &dyn NodeTransport,
    name: &str,
    data: Bytes,
    sender: Address,
    gas: Option<u64>,
) -> Result<DeployedContract, TransportError> {
    let tx_hash = transport
        .send_transaction(TransactionRequest::deployment(sender, data, gas))
        .await?;
    let receipt = transport.wait_for_receipt(tx_hash).await?;

    if !receipt.status {
        return Err(TransportError::Reverted(receipt.transaction_hash));
    }
    let address = receipt.contract_address.ok_or_else(|| {
        TransportError::Parse(format!("receipt for {tx_hash} has no contract address"))
    })?;

    info!(contract = name, %address, %tx_hash, %sender, "Contract deployed");
    Ok(DeployedContract {
        name: name.to_string(),
        address,
        transaction_hash: receipt.transaction_hash,
        sender,
    })
}

/// Deploys `interface` with `constructor_args` from the account selected
/// right now.
#[instrument(skip(provider, interface, constructor_args), fields(contract = %interface.name))]
pub async fn deploy_contract(
    provider: &ProviderBinding,
    interface: &ContractInterface,
    constructor_args: &[AbiValue],
) -> Result<DeployedContract, DeploymentError> {
    let transport = provider
        .current_provider()
        .ok_or_else(|| DeploymentError::ProviderUnavailable("no node connection".to_string()))?;
    let sender = provider
        .current_account()
        .ok_or_else(|| DeploymentError::ProviderUnavailable("no account selected".to_string()))?;
    let data = creation_data(interface, constructor_args)?;

    submit_creation(transport.as_ref(), &interface.name, data, sender, None)
        .await
        .map_err(|source| DeploymentError::DeploymentFailed {
            contract: interface.name.clone(),
            deployed: Vec::new(),
            source,
        })
}
