//! # Configuration
//!
//! TOML-backed configuration for the coordinator. Every section has serde
//! defaults, so an empty file yields the stock setup: a local node, the
//! four known contracts, `MycroCoin` resolved through `mycroDao`, and a
//! `BaseDao` deployment on the `test` network label.
//!
//! ```toml
//! [node]
//! endpoint = "http://127.0.0.1:8545"
//! receipt_poll_interval = "500ms"
//!
//! [query]
//! endpoint = "http://127.0.0.1:4000/graphql"
//!
//! [deployment]
//! network_label = "test"
//! targets = ["BaseDao"]
//! ```

use crate::domain::entities::DynamicBinding;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Complete coordinator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub node: NodeConfig,
    pub query: QueryConfig,
    pub contracts: ContractsSection,
    pub deployment: DeploymentConfig,
    pub logging: LoggingConfig,
}

impl ContractsConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Validates cross-section references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("node.endpoint cannot be empty".into()));
        }
        if self.node.receipt_poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "node.receipt_poll_interval cannot be 0".into(),
            ));
        }
        if self.query.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("query.endpoint cannot be empty".into()));
        }

        let mut names = HashSet::new();
        for known in &self.contracts.known {
            if known.name.trim().is_empty() || known.artifact.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "contract name and artifact cannot be empty".into(),
                ));
            }
            if !names.insert(known.name.as_str()) {
                return Err(ConfigError::DuplicateContract(known.name.clone()));
            }
        }

        let mut fields = HashSet::new();
        for binding in &self.contracts.dynamic {
            if !names.contains(binding.contract.as_str()) {
                return Err(ConfigError::UnknownContract(binding.contract.clone()));
            }
            if binding.query_field.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "dynamic binding for {} has no query field",
                    binding.contract
                )));
            }
            if !fields.insert(binding.query_field.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "query field {} is bound twice",
                    binding.query_field
                )));
            }
        }

        for target in &self.deployment.targets {
            if !names.contains(target.as_str()) {
                return Err(ConfigError::UnknownContract(target.clone()));
            }
        }

        Ok(())
    }
}

/// Node connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint.
    pub endpoint: String,
    /// Delay between receipt polls.
    #[serde(with = "humantime_serde")]
    pub receipt_poll_interval: Duration,
    /// Per-request HTTP timeout. None waits indefinitely.
    #[serde(with = "humantime_serde::option")]
    pub request_timeout: Option<Duration>,
    /// Gas limit for deployment transactions. None lets the node estimate.
    pub deployment_gas: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            receipt_poll_interval: Duration::from_millis(500),
            request_timeout: None,
            deployment_gas: None,
        }
    }
}

/// Remote address query service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// GraphQL endpoint.
    pub endpoint: String,
    #[serde(with = "humantime_serde::option")]
    pub request_timeout: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:4000/graphql".to_string(),
            request_timeout: None,
        }
    }
}

/// A contract known at startup and the artifact describing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownContract {
    /// Logical registry name.
    pub name: String,
    /// Artifact file, relative to `artifacts_dir`.
    pub artifact: String,
}

impl KnownContract {
    pub fn new(name: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact: artifact.into(),
        }
    }
}

/// Contract artifacts and registry layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsSection {
    /// Directory holding compiled artifacts.
    pub artifacts_dir: PathBuf,
    /// Every contract registered at startup.
    pub known: Vec<KnownContract>,
    /// Contracts whose address is resolved remotely.
    pub dynamic: Vec<DynamicBinding>,
}

impl Default for ContractsSection {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("build/contracts"),
            known: vec![
                KnownContract::new("MycroCoin", "MycroCoin.json"),
                KnownContract::new("BaseDao", "BaseDao.json"),
                KnownContract::new("MergeAsc", "MergeASC.json"),
                KnownContract::new("MergeModule", "MergeModule.json"),
            ],
            dynamic: vec![DynamicBinding::new("MycroCoin", "mycroDao")],
        }
    }
}

impl ContractsSection {
    /// Artifact file for `name`, if known.
    #[must_use]
    pub fn artifact_of(&self, name: &str) -> Option<&str> {
        self.known
            .iter()
            .find(|k| k.name == name)
            .map(|k| k.artifact.as_str())
    }
}

/// Startup deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Target network label recorded in the plan.
    pub network_label: String,
    /// Contracts deployed at startup, in order.
    pub targets: Vec<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            network_label: "test".to_string(),
            targets: vec!["BaseDao".to_string()],
        }
    }
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("contract {0} is listed twice")]
    DuplicateContract(String),

    #[error("contract {0} is not a known contract")]
    UnknownContract(String),
}

/// Human-readable durations: `"500ms"`, `"2s"`, `"1m"`, or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::{format_duration, parse_duration};
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_some(&format_duration(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }

    pub(super) fn format_duration(duration: Duration) -> String {
        if duration.subsec_millis() == 0 {
            format!("{}s", duration.as_secs())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
