//! # Domain Invariants
//!
//! Checks that guard the coordinator's inputs and its state machine.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Interfaces carry a callable surface and code | `check_interface_well_formed()` |
//! | Coordinator phases never reorder or resume after a terminal state | `check_transition()` |

use crate::domain::entities::{ContractInterface, DeploymentState};
use crate::errors::InterfaceError;

/// An interface must have a non-empty ABI and non-empty bytecode.
pub fn check_interface_well_formed(interface: &ContractInterface) -> Result<(), InterfaceError> {
    if interface.name.trim().is_empty() {
        return Err(InterfaceError::Artifact {
            name: "<unknown>".to_string(),
            reason: "missing contract name".to_string(),
        });
    }
    if interface.abi.is_empty() {
        return Err(InterfaceError::EmptyAbi(interface.name.clone()));
    }
    if interface.bytecode.is_empty() {
        return Err(InterfaceError::MissingBytecode(interface.name.clone()));
    }
    Ok(())
}

/// Legal coordinator transitions.
///
/// `ResolvingNetwork` strictly precedes `PlanningDeployment`, which strictly
/// precedes `Deploying`. Any non-terminal phase may fail.
#[must_use]
pub fn check_transition(from: DeploymentState, to: DeploymentState) -> bool {
    use DeploymentState::{Deployed, Deploying, Failed, Idle, PlanningDeployment, ResolvingNetwork};

    match (from, to) {
        (Idle, ResolvingNetwork)
        | (ResolvingNetwork, PlanningDeployment)
        | (PlanningDeployment, Deploying)
        | (Deploying, Deployed) => true,
        (from, Failed) => !from.is_terminal(),
        _ => false,
    }
}
