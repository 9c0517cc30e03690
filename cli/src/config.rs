//! Node configuration (TOML)
//!
//! Every section and field has a default, so an empty file is a valid
//! development config.

use echo_api::{GenesisConfig, PolicyConfig};
use echo_core::{parse_units, Address, Amount, AmountError};
use governance::config::DEFAULT_VOTING_PERIOD_BLOCKS;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid amount for {field}: {source}")]
    Amount { field: String, source: AmountError },

    #[error("Invalid address for {field}: {value}")]
    Address { field: String, value: String },

    #[error("Invalid listen address: {0}")]
    Listen(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub genesis: GenesisSection,
    #[serde(default)]
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_network_name")]
    pub name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Seconds between blocks
    #[serde(default = "default_block_time")]
    pub block_time_secs: u64,
    #[serde(default = "default_voting_period")]
    pub voting_period_blocks: u64,
    /// Journal directory. Without one the node keeps no history across restarts.
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_time_secs: default_block_time(),
            voting_period_blocks: default_voting_period(),
            data_dir: None,
        }
    }
}

/// Accounts can be given as `0x` addresses or as seed labels such as
/// `"alice"`, which map to `Address::from_seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisSection {
    #[serde(default = "default_deployer")]
    pub deployer: String,
    #[serde(default = "default_deployer_balance")]
    pub deployer_balance: String,
    #[serde(default = "default_treasury_deposit")]
    pub treasury_deposit: String,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

impl Default for GenesisSection {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            deployer_balance: default_deployer_balance(),
            treasury_deposit: default_treasury_deposit(),
            allocations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub account: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    #[serde(default = "default_max_per_day")]
    pub max_per_day: usize,
    #[serde(default = "default_true")]
    pub first_proposal_free: bool,
    #[serde(default = "default_min_fee")]
    pub min_fee: String,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            max_per_day: default_max_per_day(),
            first_proposal_free: true,
            min_fee: default_min_fee(),
        }
    }
}

fn default_network_name() -> String {
    "devnet".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:24180".to_string()
}

fn default_block_time() -> u64 {
    5
}

fn default_voting_period() -> u64 {
    DEFAULT_VOTING_PERIOD_BLOCKS
}

fn default_deployer() -> String {
    "deployer".to_string()
}

fn default_deployer_balance() -> String {
    "1000".to_string()
}

fn default_treasury_deposit() -> String {
    "10".to_string()
}

fn default_max_per_day() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_min_fee() -> String {
    "0.01".to_string()
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.api
            .listen
            .parse()
            .map_err(|_| ConfigError::Listen(self.api.listen.clone()))
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        self.chain
            .data_dir
            .as_deref()
            .map(|dir| PathBuf::from(expand_path(dir)))
    }

    pub fn genesis_config(&self) -> Result<GenesisConfig, ConfigError> {
        let genesis = &self.genesis;
        let allocations = genesis
            .allocations
            .iter()
            .enumerate()
            .map(|(i, allocation)| {
                let field = format!("genesis.allocations[{}]", i);
                Ok((
                    resolve_account(&field, &allocation.account)?,
                    amount(&field, &allocation.amount)?,
                ))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(GenesisConfig {
            deployer: resolve_account("genesis.deployer", &genesis.deployer)?,
            deployer_balance: amount("genesis.deployer_balance", &genesis.deployer_balance)?,
            treasury_deposit: amount("genesis.treasury_deposit", &genesis.treasury_deposit)?,
            voting_period_blocks: self.chain.voting_period_blocks,
            allocations,
        })
    }

    pub fn policy_config(&self) -> Result<PolicyConfig, ConfigError> {
        Ok(PolicyConfig {
            max_per_day: self.policy.max_per_day,
            first_proposal_free: self.policy.first_proposal_free,
            min_fee: amount("policy.min_fee", &self.policy.min_fee)?,
        })
    }
}

/// `0x`-prefixed hex, or a seed label for a development account.
pub fn resolve_account(field: &str, value: &str) -> Result<Address, ConfigError> {
    let value = value.trim();
    if value.starts_with("0x") {
        return value.parse().map_err(|_| ConfigError::Address {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    if value.is_empty() {
        return Err(ConfigError::Address {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(Address::from_seed(value))
}

fn amount(field: &str, value: &str) -> Result<Amount, ConfigError> {
    parse_units(value).map_err(|source| ConfigError::Amount {
        field: field.to_string(),
        source,
    })
}

pub fn expand_path(path: &str) -> String {
    path.replace("$HOME", &std::env::var("HOME").unwrap_or_default())
}
