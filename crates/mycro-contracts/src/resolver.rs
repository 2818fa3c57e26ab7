//! # Dynamic Address Resolver
//!
//! Some contracts have no address known at build time; the remote query
//! service publishes it instead. The resolver asks for it on every call and
//! binds a factory handle at whatever comes back.
//!
//! ```text
//! resolve_and_bind("mycroDao")
//!     -> query{ mycroDao }
//!     <- { "data": { "mycroDao": "0x..." } }
//!     -> factory.bind_at(MycroCoin, 0x...)
//! ```
//!
//! Nothing is cached: the published address may change between calls.

use crate::domain::entities::{ContractInterface, DynamicBinding};
use crate::domain::value_objects::Address;
use crate::errors::ResolutionError;
use crate::factory::{ContractFactory, ContractHandle};
use crate::ports::outbound::AddressQueryService;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Resolves contract addresses through the remote query service.
pub struct AddressResolver {
    query: Arc<dyn AddressQueryService>,
    factory: ContractFactory,
    /// Keyed by query field.
    bindings: HashMap<String, (DynamicBinding, Arc<ContractInterface>)>,
}

impl AddressResolver {
    pub fn new(query: Arc<dyn AddressQueryService>, factory: ContractFactory) -> Self {
        Self {
            query,
            factory,
            bindings: HashMap::new(),
        }
    }

    /// Binds `binding.query_field` to `interface`.
    #[must_use]
    pub fn with_binding(
        mut self,
        binding: DynamicBinding,
        interface: Arc<ContractInterface>,
    ) -> Self {
        self.bindings
            .insert(binding.query_field.clone(), (binding, interface));
        self
    }

    /// The binding for `field`, if any.
    #[must_use]
    pub fn binding(&self, field: &str) -> Option<&DynamicBinding> {
        self.bindings.get(field).map(|(binding, _)| binding)
    }

    /// Queries `field` and binds its interface at the returned address.
    #[instrument(skip(self))]
    pub async fn resolve_and_bind(&self, field: &str) -> Result<ContractHandle, ResolutionError> {
        let (binding, interface) = self
            .bindings
            .get(field)
            .ok_or_else(|| ResolutionError::failed(field, "no contract bound to this field"))?;

        let response = self.query.query(field).await.map_err(|e| {
            warn!(error = %e, "Address query failed");
            ResolutionError::failed(field, e.to_string())
        })?;

        let address = extract_address(&response, field)?;
        info!(contract = %binding.contract, %address, "Resolved dynamic contract address");

        Ok(self.factory.bind_at(Arc::clone(interface), address)?)
    }
}

/// Reads `data.<field>` as a non-empty address string.
fn extract_address(response: &Value, field: &str) -> Result<Address, ResolutionError> {
    let raw = response
        .get("data")
        .and_then(|data| data.get(field))
        .ok_or_else(|| ResolutionError::failed(field, "missing address field"))?;

    let text = raw
        .as_str()
        .ok_or_else(|| ResolutionError::failed(field, format!("address is not a string: {raw}")))?
        .trim();
    if text.is_empty() {
        return Err(ResolutionError::failed(field, "empty address"));
    }

    text.parse::<Address>()
        .map_err(|e| ResolutionError::failed(field, format!("unparseable address {text}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{SelectedAccount, StaticQueryService};
    use crate::domain::abi::JsonAbi;
    use crate::domain::value_objects::Bytes;
    use crate::provider::ProviderBinding;
    use serde_json::json;

    const DAO: &str = "0xabc0000000000000000000000000000000000abc";

    fn mycro_coin() -> Arc<ContractInterface> {
        Arc::new(ContractInterface::new(
            "MycroCoin",
            JsonAbi::parse(["function totalSupply() view returns (uint256)"]).unwrap(),
            Bytes::from(vec![0x60, 0x80]),
        ))
    }

    fn resolver(query: Arc<StaticQueryService>) -> AddressResolver {
        let provider = ProviderBinding::disconnected(Arc::new(SelectedAccount::new(Address::new(
            [1; 20],
        ))));
        AddressResolver::new(query, ContractFactory::new(provider))
            .with_binding(DynamicBinding::new("MycroCoin", "mycroDao"), mycro_coin())
    }

    #[tokio::test]
    async fn test_resolves_and_binds() {
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let handle = resolver(query).resolve_and_bind("mycroDao").await.unwrap();

        assert_eq!(handle.name(), "MycroCoin");
        assert_eq!(handle.address(), Some(DAO.parse::<Address>().unwrap()));
        assert_eq!(handle.default_sender(), Some(Address::new([1; 20])));
    }

    #[tokio::test]
    async fn test_empty_address_fails() {
        let query = Arc::new(StaticQueryService::with_address("mycroDao", ""));
        let err = resolver(query).resolve_and_bind("mycroDao").await.unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::AddressResolutionFailed { ref reason, .. } if reason == "empty address"
        ));
    }

    #[tokio::test]
    async fn test_missing_field_fails() {
        let query = Arc::new(StaticQueryService::new(json!({ "data": {} })));
        let err = resolver(query).resolve_and_bind("mycroDao").await.unwrap_err();
        assert!(matches!(err, ResolutionError::AddressResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn test_null_and_garbage_addresses_fail() {
        let query = Arc::new(StaticQueryService::new(json!({ "data": { "mycroDao": null } })));
        let resolver = resolver(query.clone());
        assert!(resolver.resolve_and_bind("mycroDao").await.is_err());

        query.set_response(json!({ "data": { "mycroDao": "0x12" } }));
        assert!(matches!(
            resolver.resolve_and_bind("mycroDao").await,
            Err(ResolutionError::AddressResolutionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_query_failure_fails() {
        let query = Arc::new(StaticQueryService::failing("service down"));
        let err = resolver(query).resolve_and_bind("mycroDao").await.unwrap_err();
        assert!(err.to_string().contains("service down"));
    }

    #[tokio::test]
    async fn test_unbound_field_never_queries() {
        let query = Arc::new(StaticQueryService::with_address("other", DAO));
        let resolver = resolver(query.clone());
        assert!(resolver.resolve_and_bind("other").await.is_err());
        assert_eq!(query.invocations(), 0);
    }

    #[tokio::test]
    async fn test_every_call_requeries() {
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let resolver = resolver(query.clone());

        let first = resolver.resolve_and_bind("mycroDao").await.unwrap();
        let moved = "0xdef0000000000000000000000000000000000def";
        query.set_response(json!({ "data": { "mycroDao": moved } }));
        let second = resolver.resolve_and_bind("mycroDao").await.unwrap();

        assert_eq!(query.invocations(), 2);
        assert_ne!(first.address(), second.address());
        assert_eq!(second.address(), Some(moved.parse::<Address>().unwrap()));
    }
}
