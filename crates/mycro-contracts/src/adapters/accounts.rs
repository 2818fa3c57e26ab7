//! # Selected Account
//!
//! Holder for the wallet account the user currently has selected. The wallet
//! integration (or a test) switches it; every reader sees the new value.

use crate::domain::value_objects::Address;
use crate::ports::outbound::AccountSource;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Switchable selected account. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct SelectedAccount {
    slot: Arc<RwLock<Option<Address>>>,
}

impl SelectedAccount {
    /// Starts with `account` selected.
    #[must_use]
    pub fn new(account: Address) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(account))),
        }
    }

    /// Starts with no account (wallet locked or not yet connected).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// User switched to `account`.
    pub fn select(&self, account: Address) {
        let previous = self.slot.write().replace(account);
        if previous != Some(account) {
            info!(from = ?previous, to = %account, "Selected account changed");
        }
    }

    /// Wallet locked.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }
}

impl AccountSource for SelectedAccount {
    fn selected_account(&self) -> Option<Address> {
        *self.slot.read()
    }
}
