//! # Driving Ports (API - Inbound)
//!
//! What the application layer consumes: contract handles by logical name.

use crate::errors::{RegistryError, ResolutionError};
use crate::factory::ContractHandle;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;

/// Result of looking a contract up by name.
pub enum Lookup {
    /// Statically bound; available immediately.
    Ready(ContractHandle),
    /// Dynamically addressed; resolves through the remote query service.
    Pending(BoxFuture<'static, Result<ContractHandle, ResolutionError>>),
}

impl Lookup {
    /// True for [`Lookup::Ready`].
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Waits for the handle, whichever form it takes.
    pub async fn into_handle(self) -> Result<ContractHandle, ResolutionError> {
        match self {
            Self::Ready(handle) => Ok(handle),
            Self::Pending(pending) => pending.await,
        }
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(handle) => f.debug_tuple("Ready").field(handle).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Name-to-handle lookup exposed to the application.
#[async_trait]
pub trait ContractLookup: Send + Sync {
    /// Looks up `name`. Static names never touch the network.
    fn get(&self, name: &str) -> Result<Lookup, RegistryError>;

    /// Every registered name, sorted.
    fn names(&self) -> Vec<String>;

    /// Looks up `name` and waits for the handle.
    async fn resolve(&self, name: &str) -> Result<ContractHandle, RegistryError> {
        Ok(self.get(name)?.into_handle().await?)
    }
}
