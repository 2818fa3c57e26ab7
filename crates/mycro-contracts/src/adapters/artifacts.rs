//! Filesystem artifact store: one truffle-style JSON file per contract.

use crate::domain::entities::ContractInterface;
use crate::errors::InterfaceError;
use crate::ports::outbound::ArtifactSource;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads artifacts from a build directory such as `build/contracts`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `artifact` inside the store, with `.json` appended when it has no extension.
    fn path_of(&self, artifact: &str) -> PathBuf {
        let path = self.dir.join(artifact);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension("json")
        }
    }
}

impl ArtifactSource for FsArtifactStore {
    fn load(&self, artifact: &str) -> Result<ContractInterface, InterfaceError> {
        let path = self.path_of(artifact);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                InterfaceError::NotFound(path.display().to_string())
            } else {
                InterfaceError::Artifact {
                    name: artifact.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let interface = ContractInterface::from_artifact_json(&content)?;
        debug!(
            artifact,
            contract = %interface.name,
            networks = interface.networks.len(),
            "Loaded contract artifact"
        );
        Ok(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Address, NetworkId};

    const BASE_DAO: &str = r#"{
        "contractName": "BaseDao",
        "abi": [
            { "type": "constructor", "inputs": [] },
            {
                "type": "function",
                "name": "owner",
                "inputs": [],
                "outputs": [{ "name": "", "type": "address" }],
                "stateMutability": "view"
            }
        ],
        "bytecode": "0x6080604052",
        "networks": {
            "5777": { "address": "0x1111111111111111111111111111111111111111" }
        }
    }"#;

    fn store_with(name: &str, content: &str) -> (tempfile::TempDir, FsArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(name), content).unwrap();
        let store = FsArtifactStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_with_and_without_extension() {
        let (_dir, store) = store_with("BaseDao.json", BASE_DAO);

        let by_file = store.load("BaseDao.json").unwrap();
        let by_name = store.load("BaseDao").unwrap();
        assert_eq!(by_file.name, "BaseDao");
        assert_eq!(by_name.name, "BaseDao");
        assert_eq!(
            by_file.address_on(&NetworkId::from("5777")),
            Some(Address::new([0x11; 20]))
        );
    }

    #[test]
    fn test_missing_artifact() {
        let (_dir, store) = store_with("BaseDao.json", BASE_DAO);
        assert!(matches!(
            store.load("MergeASC.json"),
            Err(InterfaceError::NotFound(ref p)) if p.ends_with("MergeASC.json")
        ));
    }

    #[test]
    fn test_malformed_artifact() {
        let (_dir, store) = store_with("Broken.json", "{ not json");
        assert!(matches!(
            store.load("Broken.json"),
            Err(InterfaceError::Artifact { .. })
        ));
    }

    #[test]
    fn test_artifact_without_bytecode_is_rejected() {
        let (_dir, store) = store_with(
            "Iface.json",
            r#"{
                "contractName": "Iface",
                "abi": [{ "type": "function", "name": "f", "inputs": [], "outputs": [] }],
                "bytecode": "0x"
            }"#,
        );
        assert_eq!(
            store.load("Iface").unwrap_err(),
            InterfaceError::MissingBytecode("Iface".to_string())
        );
    }
}
