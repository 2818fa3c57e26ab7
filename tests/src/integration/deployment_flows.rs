//! # Deployment Flows
//!
//! The coordinator against an instrumented node:
//!
//! 1. Network identity is resolved before any transaction is sent
//! 2. A failed network query ends in `Failed` without deploying
//! 3. A rejected transaction mid-plan keeps earlier deployments
//! 4. The sender is the account selected when deployment starts

#[cfg(test)]
mod tests {
    use crate::integration::support::{artifact, GatedNode, ALICE, BOB};
    use mycro_contracts::adapters::{InMemoryNode, NodeCall};
    use mycro_contracts::domain::services::compute_contract_address;
    use mycro_contracts::errors::TransportError;
    use mycro_contracts::prelude::*;
    use std::sync::Arc;
    use DeploymentState::*;

    fn targets(names: &[&str]) -> Vec<Arc<ContractInterface>> {
        names.iter().map(|n| Arc::new(artifact(n))).collect()
    }

    #[tokio::test]
    async fn test_never_deploys_before_network_resolves() {
        let inner = Arc::new(InMemoryNode::new(5777));
        let gated = Arc::new(GatedNode::new(inner.clone()));
        let account = SelectedAccount::new(ALICE);
        let provider = ProviderBinding::new(gated.clone(), Arc::new(account));

        let mut handle =
            DeploymentCoordinator::new(provider, "test", targets(&["BaseDao"])).start();

        let mut state = handle.subscribe();
        state.wait_for(|s| *s == ResolvingNetwork).await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(handle.state(), ResolvingNetwork);
        assert!(inner.sent_transactions().is_empty());

        gated.release();
        assert_eq!(handle.finished().await, Deployed);

        let calls = inner.calls();
        let network = calls.iter().position(|c| *c == NodeCall::NetworkId).unwrap();
        let first_send = calls
            .iter()
            .position(|c| matches!(c, NodeCall::SendTransaction { .. }))
            .unwrap();
        assert!(network < first_send);
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_network_failure_ends_in_failed() {
        let node = Arc::new(InMemoryNode::new(5777).failing_network_id("connection refused"));
        let provider = ProviderBinding::new(node.clone(), Arc::new(SelectedAccount::new(ALICE)));

        let mut handle =
            DeploymentCoordinator::new(provider, "test", targets(&["BaseDao"])).start();
        assert_eq!(handle.finished().await, Failed);
        assert!(!handle.history().contains(&Deploying));
        assert!(!handle.history().contains(&PlanningDeployment));

        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, DeploymentError::NetworkResolutionFailed(_)));
        assert!(node.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_partial_deployment_is_not_rolled_back() {
        let node = Arc::new(InMemoryNode::new(5777).rejecting_deployment(1));
        let provider = ProviderBinding::new(node.clone(), Arc::new(SelectedAccount::new(ALICE)));

        let handle = DeploymentCoordinator::new(
            provider,
            "test",
            targets(&["BaseDao", "MergeASC", "MergeModule"]),
        )
        .start();
        let err = handle.wait().await.unwrap_err();

        let deployed = err.deployed();
        assert_eq!(deployed.len(), 1);
        assert_eq!(deployed[0].name, "BaseDao");
        assert_eq!(deployed[0].address, compute_contract_address(ALICE, 0));
        assert!(matches!(
            err,
            DeploymentError::DeploymentFailed {
                ref contract,
                source: TransportError::Rejected(_),
                ..
            } if contract == "MergeASC"
        ));

        // Contract 1 still has code; 2 and 3 were never created
        assert!(node.code_at(compute_contract_address(ALICE, 0)).is_some());
        assert_eq!(node.deployments().len(), 1);
    }

    #[tokio::test]
    async fn test_account_switched_while_resolving_is_used() {
        let inner = Arc::new(InMemoryNode::new(5777));
        let gated = Arc::new(GatedNode::new(inner.clone()));
        let account = SelectedAccount::new(ALICE);
        let provider = ProviderBinding::new(gated.clone(), Arc::new(account.clone()));

        let handle = DeploymentCoordinator::new(provider, "test", targets(&["BaseDao"])).start();
        let mut state = handle.subscribe();
        state.wait_for(|s| *s == ResolvingNetwork).await.unwrap();

        // User switches accounts while the network query is in flight
        account.select(BOB);
        gated.release();

        let report = handle.wait().await.unwrap();
        assert_eq!(report.plan.sender, Some(BOB));
        assert_eq!(report.deployed[0].sender, BOB);
        assert_eq!(inner.sent_transactions()[0].from, BOB);
    }

    #[tokio::test]
    async fn test_dropped_handle_keeps_running() {
        let node = Arc::new(InMemoryNode::new(5777));
        let provider = ProviderBinding::new(node.clone(), Arc::new(SelectedAccount::new(ALICE)));

        let handle = DeploymentCoordinator::new(provider, "test", targets(&["BaseDao"])).start();
        let mut state = handle.subscribe();
        drop(handle);

        state.wait_for(|s| s.is_terminal()).await.unwrap();
        assert_eq!(*state.borrow(), Deployed);
        assert_eq!(node.deployments().len(), 1);
    }
}
