//! # Deployment Coordinator
//!
//! Resolves the network identity, plans a deployment for a fixed subset of
//! contracts, then deploys them in order.
//!
//! ```text
//! Idle -> ResolvingNetwork -> PlanningDeployment -> Deploying -> Deployed
//!                                                            \-> Failed
//! ```
//!
//! The sending account is read from the provider when `Deploying` starts,
//! not when the coordinator is created. A user who switches accounts while
//! the network query is in flight deploys from the new account. Contracts
//! deployed before a failure stay deployed.

use super::executor::{creation_data, submit_creation};
use super::DeploymentHandle;
use crate::domain::entities::{
    ContractInterface, DeploymentPlan, DeploymentReport, DeploymentState,
};
use crate::domain::invariants::check_transition;
use crate::errors::DeploymentError;
use crate::provider::ProviderBinding;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

/// Drives one deployment from `Idle` to `Deployed` or `Failed`.
pub struct DeploymentCoordinator {
    provider: ProviderBinding,
    network_label: String,
    targets: Vec<Arc<ContractInterface>>,
    gas: Option<u64>,
    state: watch::Sender<DeploymentState>,
    history: Arc<Mutex<Vec<DeploymentState>>>,
}

impl DeploymentCoordinator {
    /// A coordinator in `Idle` that will deploy `targets` in order.
    pub fn new(
        provider: ProviderBinding,
        network_label: impl Into<String>,
        targets: Vec<Arc<ContractInterface>>,
    ) -> Self {
        let (state, _) = watch::channel(DeploymentState::Idle);
        Self {
            provider,
            network_label: network_label.into(),
            targets,
            gas: None,
            state,
            history: Arc::new(Mutex::new(vec![DeploymentState::Idle])),
        }
    }

    /// Gas limit for each creation transaction.
    #[must_use]
    pub fn with_gas(mut self, gas: Option<u64>) -> Self {
        self.gas = gas;
        self
    }

    #[must_use]
    pub fn state(&self) -> DeploymentState {
        *self.state.borrow()
    }

    /// Spawns the run on the current runtime.
    ///
    /// Dropping the returned handle does not cancel the deployment.
    #[must_use]
    pub fn start(self) -> DeploymentHandle {
        let state = self.state.subscribe();
        let history = Arc::clone(&self.history);
        let task = tokio::spawn(self.run());
        DeploymentHandle::new(state, history, task)
    }

    /// Runs the whole lifecycle on the calling task.
    #[instrument(skip(self), fields(network_label = %self.network_label))]
    pub async fn run(self) -> Result<DeploymentReport, DeploymentError> {
        let result = self.execute().await;
        match &result {
            Ok(report) => {
                info!(
                    network = %report.plan.network_id,
                    deployed = report.deployed.len(),
                    "Deployment complete"
                );
            }
            Err(e) => {
                error!(error = %e, deployed = e.deployed().len(), "Deployment failed");
                self.fail();
            }
        }
        result
    }

    async fn execute(&self) -> Result<DeploymentReport, DeploymentError> {
        self.transition(DeploymentState::ResolvingNetwork)?;
        let transport = self
            .provider
            .current_provider()
            .ok_or_else(|| DeploymentError::ProviderUnavailable("no node connection".to_string()))?;
        let network_id = transport
            .network_id()
            .await
            .map_err(DeploymentError::NetworkResolutionFailed)?;
        debug!(%network_id, "Network resolved");

        self.transition(DeploymentState::PlanningDeployment)?;
        let mut plan = DeploymentPlan::new(&self.network_label, network_id, self.targets.clone());
        let payloads = plan
            .contracts
            .iter()
            .map(|interface| {
                interface.validate()?;
                creation_data(interface, &[])
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(contracts = ?plan.contract_names(), "Deployment planned");

        self.transition(DeploymentState::Deploying)?;
        // Read now, not at Idle
        let sender = self
            .provider
            .current_account()
            .ok_or_else(|| {
                DeploymentError::ProviderUnavailable("no account selected".to_string())
            })?;
        plan.sender = Some(sender);
        info!(%sender, contracts = plan.contracts.len(), "Deploying");

        let mut deployed = Vec::with_capacity(plan.contracts.len());
        for (interface, data) in plan.contracts.iter().zip(payloads) {
            let outcome =
                submit_creation(transport.as_ref(), &interface.name, data, sender, self.gas).await;
            match outcome {
                Ok(contract) => deployed.push(contract),
                Err(source) => {
                    return Err(DeploymentError::DeploymentFailed {
                        contract: interface.name.clone(),
                        deployed,
                        source,
                    });
                }
            }
        }

        self.transition(DeploymentState::Deployed)?;
        Ok(DeploymentReport { plan, deployed })
    }

    fn transition(&self, to: DeploymentState) -> Result<(), DeploymentError> {
        let from = *self.state.borrow();
        if !check_transition(from, to) {
            return Err(DeploymentError::InvalidTransition { from, to });
        }
        self.history.lock().push(to);
        self.state.send_replace(to);
        debug!(%from, %to, "Deployment state changed");
        Ok(())
    }

    fn fail(&self) {
        let from = *self.state.borrow();
        if check_transition(from, DeploymentState::Failed) {
            self.history.lock().push(DeploymentState::Failed);
            self.state.send_replace(DeploymentState::Failed);
        }
    }
}
