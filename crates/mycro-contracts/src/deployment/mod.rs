//! # Deployment
//!
//! | Piece | Role |
//! |-------|------|
//! | [`DeploymentCoordinator`] | Network resolution, planning and ordered deployment |
//! | [`DeploymentHandle`] | Completion signal of a started coordinator |
//! | [`deploy_contract`] | One-off deployment from the account selected at call time |

pub mod coordinator;
pub mod executor;

pub use coordinator::DeploymentCoordinator;
pub use executor::{creation_data, deploy_contract};

use crate::domain::entities::{DeploymentReport, DeploymentState};
use crate::errors::DeploymentError;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Observes a running coordinator and yields its outcome.
///
/// The application may await [`Self::wait`] or ignore the handle entirely;
/// dropping it leaves the deployment running.
#[derive(Debug)]
pub struct DeploymentHandle {
    state: watch::Receiver<DeploymentState>,
    history: Arc<Mutex<Vec<DeploymentState>>>,
    task: JoinHandle<Result<DeploymentReport, DeploymentError>>,
}

impl DeploymentHandle {
    pub(crate) fn new(
        state: watch::Receiver<DeploymentState>,
        history: Arc<Mutex<Vec<DeploymentState>>>,
        task: JoinHandle<Result<DeploymentReport, DeploymentError>>,
    ) -> Self {
        Self {
            state,
            history,
            task,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DeploymentState {
        *self.state.borrow()
    }

    /// Every state entered so far, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> Vec<DeploymentState> {
        self.history.lock().clone()
    }

    /// A receiver notified on every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DeploymentState> {
        self.state.clone()
    }

    /// Waits until the coordinator reaches `Deployed` or `Failed`.
    pub async fn finished(&mut self) -> DeploymentState {
        // Errors only if the task stopped without reaching a terminal state
        let _ = self.state.wait_for(|s| s.is_terminal()).await;
        *self.state.borrow()
    }

    /// Waits for the outcome.
    pub async fn wait(self) -> Result<DeploymentReport, DeploymentError> {
        self.task
            .await
            .map_err(|e| DeploymentError::Aborted(e.to_string()))?
    }
}
