//! # Provider Binding
//!
//! Wraps the ambient blockchain connection: a node transport plus the
//! currently selected account. Passed explicitly into the factory and the
//! deployment coordinator so the points at which the account is read are
//! visible in the code.
//!
//! Neither accessor is cached: the wallet may connect after startup and the
//! user may switch accounts at any time. The binding never fails on its own;
//! it reports absence and callers decide what absence means.

use crate::domain::value_objects::Address;
use crate::errors::HandleError;
use crate::ports::outbound::{AccountSource, NodeTransport};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to the active node connection and selected account.
///
/// Cloning is cheap; clones observe the same connection and account.
#[derive(Clone)]
pub struct ProviderBinding {
    transport: Arc<RwLock<Option<Arc<dyn NodeTransport>>>>,
    accounts: Arc<dyn AccountSource>,
}

impl ProviderBinding {
    /// Binds a connected transport.
    pub fn new(transport: Arc<dyn NodeTransport>, accounts: Arc<dyn AccountSource>) -> Self {
        Self {
            transport: Arc::new(RwLock::new(Some(transport))),
            accounts,
        }
    }

    /// A binding with no node connection yet.
    pub fn disconnected(accounts: Arc<dyn AccountSource>) -> Self {
        Self {
            transport: Arc::new(RwLock::new(None)),
            accounts,
        }
    }

    /// Installs or replaces the node connection for every clone.
    pub fn connect(&self, transport: Arc<dyn NodeTransport>) {
        debug!("Provider connected");
        *self.transport.write() = Some(transport);
    }

    /// Drops the node connection for every clone.
    pub fn disconnect(&self) {
        debug!("Provider disconnected");
        *self.transport.write() = None;
    }

    /// The transport used by all outbound calls, if connected.
    #[must_use]
    pub fn current_provider(&self) -> Option<Arc<dyn NodeTransport>> {
        self.transport.read().clone()
    }

    /// The account used as default transaction sender, read live.
    #[must_use]
    pub fn current_account(&self) -> Option<Address> {
        self.accounts.selected_account()
    }

    /// Like [`Self::current_provider`], mapping absence to `ProviderUnavailable`.
    pub fn require_provider(&self) -> Result<Arc<dyn NodeTransport>, HandleError> {
        self.current_provider().ok_or(HandleError::ProviderUnavailable)
    }
}

impl fmt::Debug for ProviderBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBinding")
            .field("connected", &self.transport.read().is_some())
            .field("account", &self.current_account())
            .finish()
    }
}
