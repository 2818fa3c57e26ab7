//! # Resolution Flows
//!
//! Registry lookups while the coordinator is still resolving the network,
//! and dynamic addresses served by the query service.

#[cfg(test)]
mod tests {
    use crate::integration::support::{stock_artifacts, GatedNode, ALICE, DAO};
    use mycro_contracts::adapters::{InMemoryNode, NodeCall, StaticQueryService};
    use mycro_contracts::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        inner: Arc<InMemoryNode>,
        gated: Arc<GatedNode>,
        query: Arc<StaticQueryService>,
        service: ContractsService,
    }

    fn fixture() -> Fixture {
        let inner = Arc::new(InMemoryNode::new(5777));
        let gated = Arc::new(GatedNode::new(inner.clone()));
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let service = ContractsService::start(
            ContractsConfig::default(),
            ProviderBinding::new(gated.clone(), Arc::new(SelectedAccount::new(ALICE))),
            query.clone(),
            &stock_artifacts(),
        )
        .unwrap();

        Fixture {
            inner,
            gated,
            query,
            service,
        }
    }

    #[tokio::test]
    async fn test_static_names_ready_before_network_resolves() {
        let f = fixture();
        let registry = f.service.registry();

        for name in ["BaseDao", "MergeAsc", "MergeModule"] {
            match registry.get(name).unwrap() {
                Lookup::Ready(handle) => assert_eq!(handle.default_sender(), Some(ALICE)),
                Lookup::Pending(_) => panic!("{name} should be statically bound"),
            }
        }
        assert!(matches!(
            f.service.deployment().unwrap().state(),
            DeploymentState::Idle | DeploymentState::ResolvingNetwork
        ));
        assert!(f.inner.calls().is_empty());

        f.gated.release();
    }

    #[tokio::test]
    async fn test_dynamic_name_binds_to_queried_address() {
        let f = fixture();
        let handle = f.service.registry().resolve("MycroCoin").await.unwrap();

        assert_eq!(handle.name(), "MycroCoin");
        assert_eq!(handle.address(), Some(DAO.parse::<Address>().unwrap()));
        assert_eq!(handle.interface().functions("vote").len(), 1);
        // Resolution never touched the node
        assert!(!f.inner.calls().contains(&NodeCall::NetworkId));
    }

    #[tokio::test]
    async fn test_dynamic_name_requeries_each_time() {
        let f = fixture();
        let registry = f.service.registry();

        let first = registry.resolve("MycroCoin").await.unwrap();
        f.query.set_response(json!({
            "data": { "mycroDao": "0x00000000000000000000000000000000000000dd" }
        }));
        let second = registry.resolve("MycroCoin").await.unwrap();

        assert_eq!(f.query.invocations(), 2);
        assert_ne!(first.address(), second.address());
    }

    #[tokio::test]
    async fn test_missing_address_yields_no_handle() {
        let f = fixture();
        f.query.set_response(json!({ "data": { "mycroDao": null } }));

        let err = f.service.registry().resolve("MycroCoin").await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Resolution(ResolutionError::AddressResolutionFailed { ref field, .. })
                if field == "mycroDao"
        ));
    }

    #[tokio::test]
    async fn test_query_service_down() {
        let inner = Arc::new(InMemoryNode::new(5777));
        let service = ContractsService::start(
            ContractsConfig::default(),
            ProviderBinding::new(inner, Arc::new(SelectedAccount::new(ALICE))),
            Arc::new(StaticQueryService::failing("connection refused")),
            &stock_artifacts(),
        )
        .unwrap();

        let registry = service.registry();
        assert!(registry.resolve("MycroCoin").await.is_err());
        // Static entries are unaffected
        assert!(registry.resolve("BaseDao").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_contract() {
        let f = fixture();
        assert!(matches!(
            f.service.registry().get("Treasury"),
            Err(RegistryError::UnknownContract(_))
        ));
    }
}
