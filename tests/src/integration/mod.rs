//! Integration flows across provider, factory, coordinator, resolver and registry.

pub mod bootstrap;
pub mod deployment_flows;
pub mod resolution_flows;
pub mod support;
