//! # Domain Layer (Inner Hexagon)
//!
//! Pure domain types and logic for the contract coordinator.
//! NO I/O, NO async.
//!
//! - This is the **inner layer** of the hexagonal architecture.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod abi;
pub mod entities;
pub mod invariants;
pub mod services;
pub mod value_objects;

pub use abi::*;
pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
