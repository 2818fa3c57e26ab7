//! # Contract Registry
//!
//! Logical contract name to handle. Static entries are bound at startup and
//! returned synchronously; dynamic entries go through the
//! [`AddressResolver`] on every lookup.
//!
//! The registry is built once and read-only afterwards. It knows nothing
//! about deployment or the network.

use crate::errors::{InterfaceError, RegistryError};
use crate::factory::ContractHandle;
use crate::ports::inbound::{ContractLookup, Lookup};
use crate::resolver::AddressResolver;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug)]
enum RegistryEntry {
    Static(ContractHandle),
    /// Resolved through this query field.
    Dynamic(String),
}

/// Name-to-handle mapping consumed by the application.
pub struct ContractRegistry {
    entries: HashMap<String, RegistryEntry>,
    resolver: Arc<AddressResolver>,
}

impl ContractRegistry {
    pub fn builder(resolver: Arc<AddressResolver>) -> ContractRegistryBuilder {
        ContractRegistryBuilder {
            entries: HashMap::new(),
            resolver,
        }
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `name` resolves through the query service.
    #[must_use]
    pub fn is_dynamic(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(RegistryEntry::Dynamic(_)))
    }
}

impl ContractLookup for ContractRegistry {
    fn get(&self, name: &str) -> Result<Lookup, RegistryError> {
        match self.entries.get(name) {
            Some(RegistryEntry::Static(handle)) => Ok(Lookup::Ready(handle.clone())),
            Some(RegistryEntry::Dynamic(field)) => {
                debug!(contract = name, field = %field, "Resolving dynamic contract");
                let resolver = Arc::clone(&self.resolver);
                let field = field.clone();
                Ok(Lookup::Pending(
                    async move { resolver.resolve_and_bind(&field).await }.boxed(),
                ))
            }
            None => Err(RegistryError::UnknownContract(name.to_string())),
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Builds a [`ContractRegistry`].
pub struct ContractRegistryBuilder {
    entries: HashMap<String, RegistryEntry>,
    resolver: Arc<AddressResolver>,
}

impl ContractRegistryBuilder {
    /// Registers a statically bound handle under `name`.
    #[must_use]
    pub fn with_static(mut self, name: impl Into<String>, handle: ContractHandle) -> Self {
        self.entries.insert(name.into(), RegistryEntry::Static(handle));
        self
    }

    /// Registers `name` as resolved through `query_field`.
    ///
    /// Fails if the resolver has no binding for that field. Replaces any
    /// static entry with the same name.
    pub fn with_dynamic(
        mut self,
        name: impl Into<String>,
        query_field: impl Into<String>,
    ) -> Result<Self, InterfaceError> {
        let name = name.into();
        let query_field = query_field.into();
        if self.resolver.binding(&query_field).is_none() {
            return Err(InterfaceError::NotFound(format!(
                "{name} (query field {query_field})"
            )));
        }
        self.entries.insert(name, RegistryEntry::Dynamic(query_field));
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> ContractRegistry {
        ContractRegistry {
            entries: self.entries,
            resolver: self.resolver,
        }
    }
}
