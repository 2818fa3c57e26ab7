//! # Mycro Contracts - Client-Side Contract Coordinator
//!
//! Exposes a fixed set of smart-contract handles to an application, binds
//! them to the connected node, deploys a designated subset at startup, and
//! resolves the address of dynamically located contracts through a remote
//! query service.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Provider Binding | `provider.rs` | Node transport + selected account, read live |
//! | Contract Factory | `factory.rs` | Interface -> callable handle with default sender |
//! | Deployment Coordinator | `deployment/` | Network resolution, planning, ordered deployment |
//! | Dynamic Address Resolver | `resolver.rs` | `query{ <field> }` -> handle at that address |
//! | Contract Registry | `registry.rs` | Logical name -> handle, ready or pending |
//! | Service | `service.rs` | Startup wiring |
//!
//! ## Deployment State Machine
//!
//! | From | To | Trigger |
//! |------|----|---------|
//! | `Idle` | `ResolvingNetwork` | coordinator started |
//! | `ResolvingNetwork` | `PlanningDeployment` | network identity resolved |
//! | `PlanningDeployment` | `Deploying` | plan built, sender read |
//! | `Deploying` | `Deployed` | every creation mined |
//! | any non-terminal | `Failed` | provider, network, interface or transaction error |
//!
//! ## Outbound Ports
//!
//! | Trait | Production adapter | Test adapter |
//! |-------|--------------------|--------------|
//! | `NodeTransport` | `JsonRpcTransport` | `InMemoryNode` |
//! | `AccountSource` | `SelectedAccount` | `SelectedAccount` |
//! | `AddressQueryService` | `GraphQlQueryService` | `StaticQueryService` |
//! | `ArtifactSource` | `FsArtifactStore` | `InMemoryArtifacts` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use mycro_contracts::prelude::*;
//!
//! let config = ContractsConfig::from_file("contracts.toml")?;
//! init_tracing(&config.logging)?;
//!
//! let account = SelectedAccount::new(wallet_account);
//! let service = ContractsService::connect(config, Arc::new(account.clone()))?;
//!
//! let dao = service.registry().resolve("MycroCoin").await?;
//! let supply = dao.call("totalSupply", &[]).await?;
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod deployment;
pub mod domain;
pub mod errors;
pub mod factory;
pub mod ports;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::abi::{int, uint, AbiValue, JsonAbi};
    pub use crate::domain::entities::{
        ContractInterface, DeployedContract, DeploymentPlan, DeploymentReport, DeploymentState,
        DynamicBinding, TransactionReceipt,
    };
    pub use crate::domain::value_objects::{Address, Bytes, NetworkId, TxHash, U256};

    // Components
    pub use crate::deployment::{deploy_contract, DeploymentCoordinator, DeploymentHandle};
    pub use crate::factory::{ContractFactory, ContractHandle};
    pub use crate::provider::ProviderBinding;
    pub use crate::registry::ContractRegistry;
    pub use crate::resolver::AddressResolver;
    pub use crate::service::ContractsService;

    // Ports
    pub use crate::ports::inbound::{ContractLookup, Lookup};
    pub use crate::ports::outbound::{
        AccountSource, AddressQueryService, ArtifactSource, NodeTransport,
    };

    // Adapters
    pub use crate::adapters::{
        FsArtifactStore, GraphQlQueryService, JsonRpcTransport, SelectedAccount,
    };

    // Configuration and telemetry
    pub use crate::config::ContractsConfig;
    pub use crate::telemetry::init_tracing;

    // Errors
    pub use crate::errors::{
        DeploymentError, HandleError, InterfaceError, QueryError, RegistryError,
        ResolutionError, ServiceError, TransportError,
    };
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
