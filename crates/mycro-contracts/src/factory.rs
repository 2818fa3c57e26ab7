//! # Contract Factory
//!
//! Turns a [`ContractInterface`] into a [`ContractHandle`] bound to the
//! current provider, with the current account as default sender.
//!
//! No network validation happens here: a handle binds even if nothing is
//! deployed at its address, and the mismatch surfaces at call time at the
//! node boundary.

use crate::domain::abi::AbiValue;
use crate::domain::entities::{
    CallRequest, ContractInterface, TransactionReceipt, TransactionRequest,
};
use crate::domain::value_objects::{Address, U256};
use crate::errors::{HandleError, InterfaceError, TransportError};
use crate::provider::ProviderBinding;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Builds contract handles over one provider binding.
#[derive(Clone, Debug)]
pub struct ContractFactory {
    provider: ProviderBinding,
}

impl ContractFactory {
    /// Creates a factory over `provider`.
    #[must_use]
    pub fn new(provider: ProviderBinding) -> Self {
        Self { provider }
    }

    /// The provider handles are bound to.
    #[must_use]
    pub fn provider(&self) -> &ProviderBinding {
        &self.provider
    }

    /// Creates an address-less handle for `interface`.
    ///
    /// The default sender is the account selected right now; later account
    /// switches are not reflected in this handle.
    pub fn create_handle(
        &self,
        interface: Arc<ContractInterface>,
    ) -> Result<ContractHandle, InterfaceError> {
        interface.validate()?;
        let default_sender = self.provider.current_account();
        debug!(contract = %interface.name, sender = ?default_sender, "Created contract handle");

        Ok(ContractHandle {
            interface,
            provider: self.provider.clone(),
            address: None,
            default_sender,
        })
    }

    /// Creates a handle for `interface` bound at `address`.
    pub fn bind_at(
        &self,
        interface: Arc<ContractInterface>,
        address: Address,
    ) -> Result<ContractHandle, InterfaceError> {
        Ok(self.create_handle(interface)?.at(address))
    }
}

// =============================================================================
// CONTRACT HANDLE
// =============================================================================

/// Callable proxy over a contract interface, an optional address and a
/// default sender.
#[derive(Clone, Debug)]
pub struct ContractHandle {
    interface: Arc<ContractInterface>,
    provider: ProviderBinding,
    address: Option<Address>,
    default_sender: Option<Address>,
}

impl ContractHandle {
    /// Contract name from the interface.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.interface.name
    }

    #[must_use]
    pub fn interface(&self) -> &Arc<ContractInterface> {
        &self.interface
    }

    /// Bound address, if any.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Sender captured when the handle was created.
    #[must_use]
    pub fn default_sender(&self) -> Option<Address> {
        self.default_sender
    }

    /// Same interface and sender, bound at `address`.
    #[must_use]
    pub fn at(&self, address: Address) -> Self {
        Self {
            address: Some(address),
            ..self.clone()
        }
    }

    /// Same handle with a different default sender.
    #[must_use]
    pub fn with_sender(&self, sender: Address) -> Self {
        Self {
            default_sender: Some(sender),
            ..self.clone()
        }
    }

    /// Binds at the address the interface records for the connected network.
    #[instrument(skip(self), fields(contract = %self.interface.name))]
    pub async fn deployed(&self) -> Result<Self, HandleError> {
        let transport = self.provider.require_provider()?;
        let network = transport.network_id().await?;

        match self.interface.address_on(&network) {
            Some(address) => {
                debug!(%network, %address, "Resolved recorded deployment");
                Ok(self.at(address))
            }
            None => Err(HandleError::NotDeployed {
                contract: self.interface.name.clone(),
                network,
            }),
        }
    }

    fn bound_address(&self) -> Result<Address, HandleError> {
        self.address
            .ok_or_else(|| HandleError::Unbound(self.interface.name.clone()))
    }

    /// Read-only call; decodes the declared outputs.
    ///
    /// `method` is a function name or a full signature such as
    /// `propose(address,uint256)`.
    pub async fn call(
        &self,
        method: &str,
        args: &[AbiValue],
    ) -> Result<Vec<AbiValue>, HandleError> {
        let prepared = self.interface.prepare_call(method, args)?;
        let to = self.bound_address()?;
        let data = prepared.calldata()?;
        let transport = self.provider.require_provider()?;

        let output = transport
            .call(CallRequest {
                from: self.default_sender,
                to,
                data: data.into(),
            })
            .await?;

        Ok(prepared.decode_output(output.as_slice())?)
    }

    /// State-changing call from the default sender; waits for the receipt.
    #[instrument(skip(self, args), fields(contract = %self.interface.name))]
    pub async fn send(
        &self,
        method: &str,
        args: &[AbiValue],
    ) -> Result<TransactionReceipt, HandleError> {
        let prepared = self.interface.prepare_call(method, args)?;
        let to = self.bound_address()?;
        let from = self
            .default_sender
            .ok_or_else(|| HandleError::NoSender(self.interface.name.clone()))?;
        let data = prepared.calldata()?;
        let transport = self.provider.require_provider()?;

        let tx_hash = transport
            .send_transaction(TransactionRequest {
                from,
                to: Some(to),
                data: data.into(),
                value: U256::zero(),
                gas: None,
            })
            .await?;
        let receipt = transport.wait_for_receipt(tx_hash).await?;

        if !receipt.status {
            return Err(TransportError::Reverted(receipt.transaction_hash).into());
        }
        info!(tx_hash = %receipt.transaction_hash, "Transaction confirmed");
        Ok(receipt)
    }
}
