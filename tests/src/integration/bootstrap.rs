//! # Bootstrap Flows
//!
//! Configuration file and artifact directory on disk, wired into a running
//! service over an in-memory node and query service.

#[cfg(test)]
mod tests {
    use crate::integration::support::{artifact_json, DAO};
    use mycro_contracts::adapters::{InMemoryNode, StaticQueryService};
    use mycro_contracts::prelude::*;
    use std::sync::Arc;

    fn write_artifacts(dir: &std::path::Path) {
        for (file, name) in [
            ("MycroCoin.json", "MycroCoin"),
            ("BaseDao.json", "BaseDao"),
            ("MergeASC.json", "MergeASC"),
            ("MergeModule.json", "MergeModule"),
        ] {
            std::fs::write(dir.join(file), artifact_json(name)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_service_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts_dir = dir.path().join("contracts");
        std::fs::create_dir(&artifacts_dir).unwrap();
        write_artifacts(&artifacts_dir);

        let config_path = dir.path().join("contracts.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
                [contracts]
                artifacts_dir = "{}"

                [deployment]
                network_label = "test"
                targets = ["BaseDao", "MergeModule"]
                "#,
                artifacts_dir.display().to_string().replace('\\', "/")
            ),
        )
        .unwrap();

        let config = ContractsConfig::from_file(&config_path).unwrap();
        // Unlisted sections keep their stock contents
        assert_eq!(config.contracts.known.len(), 4);

        let node = Arc::new(InMemoryNode::new(5777));
        let account = SelectedAccount::new(Address::new([1; 20]));
        let store = FsArtifactStore::new(&config.contracts.artifacts_dir);
        let mut service = ContractsService::start(
            config,
            ProviderBinding::new(node.clone(), Arc::new(account)),
            Arc::new(StaticQueryService::with_address("mycroDao", DAO)),
            &store,
        )
        .unwrap();

        let report = service.take_deployment().unwrap().wait().await.unwrap();
        assert_eq!(report.plan.contract_names(), vec!["BaseDao", "MergeModule"]);
        assert_eq!(report.deployed.len(), 2);
        assert_eq!(node.deployments().len(), 2);

        let coin = service.registry().resolve("MycroCoin").await.unwrap();
        assert_eq!(coin.address(), Some(DAO.parse::<Address>().unwrap()));
    }

    #[tokio::test]
    async fn test_deployed_contract_is_callable() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let mut config = ContractsConfig::default();
        config.contracts.artifacts_dir = dir.path().to_path_buf();

        let node = Arc::new(InMemoryNode::new(5777));
        let account = SelectedAccount::new(Address::new([1; 20]));
        let mut service = ContractsService::start(
            config.clone(),
            ProviderBinding::new(node.clone(), Arc::new(account)),
            Arc::new(StaticQueryService::with_address("mycroDao", DAO)),
            &FsArtifactStore::new(&config.contracts.artifacts_dir),
        )
        .unwrap();

        let report = service.take_deployment().unwrap().wait().await.unwrap();
        let base_dao = report.address_of("BaseDao").unwrap();

        // The registry is never updated by the coordinator; the application
        // rebinds the static handle at the reported address itself.
        let handle = service.registry().resolve("BaseDao").await.unwrap();
        assert_eq!(handle.address(), None);

        let receipt = handle.at(base_dao).send("vote", &[AbiValue::Bool(true)]).await.unwrap();
        assert!(receipt.status);
        assert_eq!(node.sent_transactions().last().unwrap().to, Some(base_dao));
    }
}
