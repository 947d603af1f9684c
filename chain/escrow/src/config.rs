//! Development network configuration
//!
//! Mirrors the network settings the ledger is deployed with: which chain it
//! runs on, which chains count as local development chains, and how the
//! local accounts are funded.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigError;

/// Target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "hardhat".to_string(),
            chain_id: 31337,
        }
    }
}

/// Configuration for the in-process development network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevnetConfig {
    pub network: NetworkConfig,
    /// Networks on which local fixtures may be deployed
    pub development_chains: Vec<String>,
    /// Number of funded local accounts
    pub account_count: usize,
    /// Starting wallet balance of each local account, in whole ether
    pub initial_wallet_ether: u64,
    /// Index of the named `deployer` account
    pub deployer_index: usize,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            development_chains: vec!["hardhat".to_string(), "localhost".to_string()],
            account_count: 20,
            initial_wallet_ether: 10_000,
            deployer_index: 0,
        }
    }
}

impl DevnetConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            network = %config.network.name,
            chain_id = config.network.chain_id,
            "Loaded devnet config"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account_count == 0 {
            return Err(ConfigError::Invalid {
                reason: "account_count must be at least 1".to_string(),
            });
        }
        if self.deployer_index >= self.account_count {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "deployer_index {} out of range for {} accounts",
                    self.deployer_index, self.account_count
                ),
            });
        }
        Ok(())
    }

    pub fn is_development_chain(&self) -> bool {
        self.development_chains
            .iter()
            .any(|name| *name == self.network.name)
    }
}
