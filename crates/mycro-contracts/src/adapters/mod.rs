//! # Adapters (Outer Hexagon)
//!
//! Implementations of the outbound ports.
//!
//! | Adapter | Port | Backing |
//! |---------|------|---------|
//! | `JsonRpcTransport` | `NodeTransport` | Ethereum JSON-RPC over HTTP |
//! | `GraphQlQueryService` | `AddressQueryService` | GraphQL over HTTP |
//! | `FsArtifactStore` | `ArtifactSource` | build artifact directory |
//! | `SelectedAccount` | `AccountSource` | switchable in-process slot |
//! | `InMemoryNode`, `StaticQueryService`, `InMemoryArtifacts` | all | memory, for tests |

pub mod accounts;
pub mod artifacts;
pub mod graphql;
pub mod in_memory;
pub mod json_rpc;

pub use accounts::SelectedAccount;
pub use artifacts::FsArtifactStore;
pub use graphql::GraphQlQueryService;
pub use in_memory::{InMemoryArtifacts, InMemoryNode, NodeCall, StaticQueryService};
pub use json_rpc::JsonRpcTransport;
