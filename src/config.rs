//! Configuration types for landlease-wallet
//!
//! Manages global configuration: provider endpoint and credential, contract
//! address, data directory, and the policy knobs of the synchronization core
//! (read concurrency, confirmation polling).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub provider: ProviderConfig,

    /// Address of the deployed land-listing contract
    pub contract_address: String,

    /// Optional custom data directory (profile database)
    pub data_dir: Option<String>,

    pub confirmation: ConfirmationConfig,

    /// Aggregator pool size; within the 4-8 band that keeps a single read
    /// endpoint comfortable
    pub read_concurrency: usize,
}

/// External provider connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Provider credential, opaque to the core; forwarded verbatim at
    /// provider-initialization time. Typically loaded from the
    /// LANDLEASE_API_KEY environment variable.
    pub api_key: Option<String>,
}

/// Confirmation polling policy
///
/// Both values are policy parameters, not fixed by the domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Delay between status polls
    pub poll_interval_ms: u64,

    /// Bound after which an unresolved transaction times out
    pub timeout_ms: u64,
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            timeout_ms: 120_000,
        }
    }
}

impl GlobalConfig {
    /// Default configuration against the Base Sepolia testnet
    pub fn default_testnet() -> Self {
        Self {
            provider: ProviderConfig {
                rpc_url: "https://sepolia.base.org".to_string(),
                api_key: std::env::var("LANDLEASE_API_KEY").ok(),
            },
            contract_address: String::new(),
            data_dir: None,
            confirmation: ConfirmationConfig::default(),
            read_concurrency: 6,
        }
    }

    /// Default configuration against Base mainnet
    pub fn default_mainnet() -> Self {
        Self {
            provider: ProviderConfig {
                rpc_url: "https://mainnet.base.org".to_string(),
                api_key: std::env::var("LANDLEASE_API_KEY").ok(),
            },
            contract_address: String::new(),
            data_dir: None,
            confirmation: ConfirmationConfig::default(),
            read_concurrency: 6,
        }
    }

    /// Resolved data directory for durable local state
    pub fn resolved_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => default_config_dir(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::default_testnet()
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config directory not found")]
    DirectoryNotFound,
}

/// Configuration overrides from the embedding application or environment
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub api_key: Option<String>,
    pub contract_address: Option<String>,
    pub data_dir: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub read_concurrency: Option<usize>,
}

impl ConfigOverrides {
    /// Create empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create overrides from environment variables
    pub fn from_env() -> Self {
        Self {
            rpc_url: std::env::var("LANDLEASE_RPC_URL").ok(),
            api_key: std::env::var("LANDLEASE_API_KEY").ok(),
            contract_address: std::env::var("LANDLEASE_CONTRACT_ADDRESS").ok(),
            data_dir: std::env::var("LANDLEASE_DATA_DIR").ok(),
            poll_interval_ms: std::env::var("LANDLEASE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            timeout_ms: std::env::var("LANDLEASE_CONFIRMATION_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            read_concurrency: std::env::var("LANDLEASE_READ_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Merge with another set of overrides (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if other.rpc_url.is_some() {
            self.rpc_url = other.rpc_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.contract_address.is_some() {
            self.contract_address = other.contract_address;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.poll_interval_ms.is_some() {
            self.poll_interval_ms = other.poll_interval_ms;
        }
        if other.timeout_ms.is_some() {
            self.timeout_ms = other.timeout_ms;
        }
        if other.read_concurrency.is_some() {
            self.read_concurrency = other.read_concurrency;
        }
        self
    }
}

/// Get the default configuration directory path
///
/// Returns: `~/.landlease-wallet/`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".landlease-wallet"))
        .ok_or(ConfigError::DirectoryNotFound)
}

/// Get the default configuration file path
///
/// Returns: `~/.landlease-wallet/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join("config.json"))
}

/// Load configuration from file with overrides
///
/// # Priority (highest to lowest):
/// 1. Caller overrides (passed as argument)
/// 2. Environment variables
/// 3. Config file
/// 4. Testnet defaults
pub fn load_config(
    config_path: Option<&Path>,
    caller_overrides: ConfigOverrides,
) -> Result<GlobalConfig, ConfigError> {
    // Pick up a .env file when present; values become plain env vars
    dotenv::dotenv().ok();

    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents)?
    } else {
        GlobalConfig::default()
    };

    apply_overrides(&mut config, ConfigOverrides::from_env());
    apply_overrides(&mut config, caller_overrides);

    if config.read_concurrency == 0 {
        return Err(ConfigError::Invalid(
            "read_concurrency must be at least 1".to_string(),
        ));
    }

    Ok(config)
}

/// Save configuration to file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &GlobalConfig, config_path: Option<&Path>) -> Result<(), ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;

    Ok(())
}

/// Apply configuration overrides (internal helper)
fn apply_overrides(config: &mut GlobalConfig, overrides: ConfigOverrides) {
    if let Some(url) = overrides.rpc_url {
        config.provider.rpc_url = url;
    }
    if let Some(key) = overrides.api_key {
        config.provider.api_key = Some(key);
    }
    if let Some(address) = overrides.contract_address {
        config.contract_address = address;
    }
    if let Some(dir) = overrides.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(interval) = overrides.poll_interval_ms {
        config.confirmation.poll_interval_ms = interval;
    }
    if let Some(timeout) = overrides.timeout_ms {
        config.confirmation.timeout_ms = timeout;
    }
    if let Some(concurrency) = overrides.read_concurrency {
        config.read_concurrency = concurrency;
    }
}
