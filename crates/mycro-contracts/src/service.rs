//! # Contracts Service
//!
//! Bootstraps the coordinator in startup order:
//!
//! 1. Provider Binding (given by the caller)
//! 2. Interfaces loaded from artifacts, one handle per known contract
//! 3. Registry populated immediately, no network identity needed
//! 4. Deployment Coordinator started in the background
//!
//! The registry and the deployment progress independently: a static lookup
//! never waits on the coordinator, and the coordinator never writes into the
//! registry.

use crate::adapters::{FsArtifactStore, GraphQlQueryService, JsonRpcTransport};
use crate::config::ContractsConfig;
use crate::deployment::{deploy_contract, DeploymentCoordinator, DeploymentHandle};
use crate::domain::abi::AbiValue;
use crate::domain::entities::{ContractInterface, DeployedContract};
use crate::errors::{InterfaceError, RegistryError, ServiceError};
use crate::factory::ContractFactory;
use crate::ports::outbound::{AccountSource, AddressQueryService, ArtifactSource};
use crate::provider::ProviderBinding;
use crate::registry::ContractRegistry;
use crate::resolver::AddressResolver;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The wired coordinator.
pub struct ContractsService {
    config: ContractsConfig,
    provider: ProviderBinding,
    factory: ContractFactory,
    interfaces: HashMap<String, Arc<ContractInterface>>,
    registry: Arc<ContractRegistry>,
    deployment: Option<DeploymentHandle>,
}

impl ContractsService {
    /// Starts against the configured JSON-RPC node, GraphQL service and
    /// artifact directory.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(
        config: ContractsConfig,
        accounts: Arc<dyn AccountSource>,
    ) -> Result<Self, ServiceError> {
        let transport = Arc::new(JsonRpcTransport::new(&config.node)?);
        let query = Arc::new(GraphQlQueryService::new(&config.query)?);
        let artifacts = FsArtifactStore::new(&config.contracts.artifacts_dir);
        info!(
            node = %config.node.endpoint,
            query = %config.query.endpoint,
            artifacts = %artifacts.dir().display(),
            "Connecting contracts service"
        );

        Self::start(config, ProviderBinding::new(transport, accounts), query, &artifacts)
    }

    /// Wires every component over the given ports and starts deployment.
    ///
    /// Must be called inside a tokio runtime.
    #[instrument(skip_all)]
    pub fn start(
        config: ContractsConfig,
        provider: ProviderBinding,
        query: Arc<dyn AddressQueryService>,
        artifacts: &dyn ArtifactSource,
    ) -> Result<Self, ServiceError> {
        config.validate()?;

        let mut interfaces = HashMap::new();
        for known in &config.contracts.known {
            let interface = Arc::new(artifacts.load(&known.artifact)?);
            debug!(name = %known.name, artifact = %known.artifact, "Loaded interface");
            interfaces.insert(known.name.clone(), interface);
        }
        let lookup = |name: &str| {
            interfaces
                .get(name)
                .cloned()
                .ok_or_else(|| InterfaceError::NotFound(name.to_string()))
        };

        let factory = ContractFactory::new(provider.clone());

        let mut resolver = AddressResolver::new(query, factory.clone());
        for binding in &config.contracts.dynamic {
            resolver = resolver.with_binding(binding.clone(), lookup(&binding.contract)?);
        }
        let dynamic: HashMap<&str, &str> = config
            .contracts
            .dynamic
            .iter()
            .map(|b| (b.contract.as_str(), b.query_field.as_str()))
            .collect();

        let mut builder = ContractRegistry::builder(Arc::new(resolver));
        for known in &config.contracts.known {
            builder = match dynamic.get(known.name.as_str()) {
                Some(field) => builder.with_dynamic(known.name.clone(), *field)?,
                None => {
                    let handle = factory.create_handle(lookup(&known.name)?)?;
                    builder.with_static(known.name.clone(), handle)
                }
            };
        }
        let registry = Arc::new(builder.build());
        info!(contracts = registry.len(), "Contract registry ready");

        let targets = config
            .deployment
            .targets
            .iter()
            .map(|name| lookup(name))
            .collect::<Result<Vec<_>, _>>()?;
        let deployment =
            DeploymentCoordinator::new(provider.clone(), &config.deployment.network_label, targets)
                .with_gas(config.node.deployment_gas)
                .start();

        Ok(Self {
            config,
            provider,
            factory,
            interfaces,
            registry,
            deployment: Some(deployment),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ContractsConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &ProviderBinding {
        &self.provider
    }

    #[must_use]
    pub fn factory(&self) -> &ContractFactory {
        &self.factory
    }

    /// The registry handed to the application.
    #[must_use]
    pub fn registry(&self) -> Arc<ContractRegistry> {
        Arc::clone(&self.registry)
    }

    /// Interface loaded for `name`.
    #[must_use]
    pub fn interface(&self, name: &str) -> Option<&Arc<ContractInterface>> {
        self.interfaces.get(name)
    }

    /// The startup deployment, until taken.
    #[must_use]
    pub fn deployment(&self) -> Option<&DeploymentHandle> {
        self.deployment.as_ref()
    }

    /// Takes the startup deployment to await its outcome.
    pub fn take_deployment(&mut self) -> Option<DeploymentHandle> {
        self.deployment.take()
    }

    /// Deploys the known contract `name` from the account selected now.
    pub async fn deploy_helper(
        &self,
        name: &str,
        constructor_args: &[AbiValue],
    ) -> Result<DeployedContract, ServiceError> {
        let interface = self
            .interfaces
            .get(name)
            .ok_or_else(|| RegistryError::UnknownContract(name.to_string()))?;
        Ok(deploy_contract(&self.provider, interface, constructor_args).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryArtifacts, InMemoryNode, SelectedAccount, StaticQueryService};
    use crate::domain::abi::JsonAbi;
    use crate::domain::entities::DeploymentState;
    use crate::domain::value_objects::{Address, Bytes};
    use crate::ports::inbound::ContractLookup;

    const DAO: &str = "0xabc0000000000000000000000000000000000abc";

    fn artifact(name: &str) -> ContractInterface {
        ContractInterface::new(
            name,
            JsonAbi::parse(["constructor()", "function owner() view returns (address)"]).unwrap(),
            Bytes::from(vec![0x60, 0x80]),
        )
    }

    fn artifacts() -> InMemoryArtifacts {
        InMemoryArtifacts::new()
            .with("MycroCoin.json", artifact("MycroCoin"))
            .with("BaseDao.json", artifact("BaseDao"))
            .with("MergeASC.json", artifact("MergeASC"))
            .with("MergeModule.json", artifact("MergeModule"))
    }

    fn provider(node: Arc<InMemoryNode>) -> ProviderBinding {
        ProviderBinding::new(node, Arc::new(SelectedAccount::new(Address::new([1; 20]))))
    }

    #[tokio::test]
    async fn test_default_wiring() {
        let node = Arc::new(InMemoryNode::new(5777));
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let mut service = ContractsService::start(
            ContractsConfig::default(),
            provider(node.clone()),
            query,
            &artifacts(),
        )
        .unwrap();

        let registry = service.registry();
        assert_eq!(
            registry.names(),
            vec!["BaseDao", "MergeAsc", "MergeModule", "MycroCoin"]
        );
        assert!(registry.get("MergeAsc").unwrap().is_ready());
        assert!(!registry.get("MycroCoin").unwrap().is_ready());

        let report = service.take_deployment().unwrap().wait().await.unwrap();
        assert_eq!(report.plan.contract_names(), vec!["BaseDao"]);
        assert_eq!(node.deployments().len(), 1);
        assert!(service.deployment().is_none());
    }

    #[tokio::test]
    async fn test_missing_artifact_fails_startup() {
        let node = Arc::new(InMemoryNode::new(5777));
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let store = InMemoryArtifacts::new().with("BaseDao.json", artifact("BaseDao"));

        let result =
            ContractsService::start(ContractsConfig::default(), provider(node), query, &store);
        assert!(matches!(
            result,
            Err(ServiceError::Interface(InterfaceError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_deploy_helper() {
        let node = Arc::new(InMemoryNode::new(5777));
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let mut config = ContractsConfig::default();
        config.deployment.targets.clear();
        let mut service =
            ContractsService::start(config, provider(node.clone()), query, &artifacts()).unwrap();

        let mut deployment = service.take_deployment().unwrap();
        assert_eq!(deployment.finished().await, DeploymentState::Deployed);

        let deployed = service.deploy_helper("MergeModule", &[]).await.unwrap();
        assert_eq!(deployed.name, "MergeModule");
        assert_eq!(node.deployments(), vec![deployed.address]);

        assert!(matches!(
            service.deploy_helper("Nope", &[]).await,
            Err(ServiceError::Registry(RegistryError::UnknownContract(_)))
        ));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let node = Arc::new(InMemoryNode::new(5777));
        let query = Arc::new(StaticQueryService::with_address("mycroDao", DAO));
        let mut config = ContractsConfig::default();
        config.deployment.targets = vec!["Ghost".to_string()];

        assert!(matches!(
            ContractsService::start(config, provider(node), query, &artifacts()),
            Err(ServiceError::Config(_))
        ));
    }
}
