//! # Ports (Hexagonal Architecture)
//!
//! - `inbound`: what the application calls (`ContractLookup`)
//! - `outbound`: what the coordinator needs from the outside world

pub mod inbound;
pub mod outbound;

pub use inbound::{ContractLookup, Lookup};
pub use outbound::{AccountSource, AddressQueryService, ArtifactSource, NodeTransport};
