use alloy::primitives::Address;
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use crate::Error;

pub const DEFAULT_DST_EID: u32 = 40374;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;
pub const DEFAULT_SCAN_API_URL: &str = "https://api.testnet.layerzeroscan.com";
pub const DEFAULT_SCAN_URL: &str = "https://testnet.layerzeroscan.com";
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const DEFAULT_USER_AGENT: &str = "simple-worker-auto";

fn default_dst_eid() -> u32 {
    DEFAULT_DST_EID
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

/// Where and how the explorer is queried.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    pub api_url: String,
    pub scan_url: String,
    pub page_limit: u32,
    pub user_agent: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SCAN_API_URL.to_string(),
            scan_url: DEFAULT_SCAN_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub owner: String,
    pub executor_private_key: String,
    pub executor_address: String,
    pub rpc_url: String,
    #[serde(default = "default_dst_eid")]
    pub dst_eid: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("owner", &self.owner)
            .field("executor_private_key", &"<redacted>")
            .field("executor_address", &self.executor_address)
            .field("rpc_url", &self.rpc_url)
            .field("dst_eid", &self.dst_eid)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("gas_limit", &self.gas_limit)
            .field("explorer", &self.explorer)
            .finish()
    }
}

impl Config {
    /// Loads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, Error> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{} is missing", key)))
        };

        let defaults = ExplorerConfig::default();
        let config = Config {
            owner: required("OWNER")?,
            executor_private_key: required("EXECUTOR_PRIVATE_KEY")?,
            executor_address: required("EXECUTOR_ADDRESS")?,
            rpc_url: required("RPC_SEPOLIA")?,
            dst_eid: parse_or(get("DST_EID"), "DST_EID", DEFAULT_DST_EID)?,
            poll_interval_ms: parse_or(get("POLL_INTERVAL"), "POLL_INTERVAL", DEFAULT_POLL_INTERVAL_MS)?,
            gas_limit: parse_or(get("GAS_LIMIT"), "GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
            explorer: ExplorerConfig {
                api_url: get("SCAN_API_URL").unwrap_or(defaults.api_url),
                scan_url: get("SCAN_URL").unwrap_or(defaults.scan_url),
                page_limit: parse_or(get("SCAN_PAGE_LIMIT"), "SCAN_PAGE_LIMIT", defaults.page_limit)?,
                user_agent: get("SCAN_USER_AGENT").unwrap_or(defaults.user_agent),
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.owner.trim().is_empty() {
            return Err(Error::Config("Owner address must not be empty".to_string()));
        }

        self.executor_address()?;
        self.rpc_url()?;

        let key = self.executor_private_key.trim_start_matches("0x");
        match hex::decode(key) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => {
                return Err(Error::Config(format!(
                    "Executor private key must be 32 bytes, got {}",
                    bytes.len()
                )))
            }
            Err(_) => return Err(Error::Config("Executor private key is not valid hex".to_string())),
        }

        for (name, url) in [("api_url", &self.explorer.api_url), ("scan_url", &self.explorer.scan_url)] {
            Url::parse(url)
                .map_err(|e| Error::Config(format!("Invalid explorer {}: {}", name, e)))?;
        }

        if self.poll_interval_ms == 0 {
            return Err(Error::Config("Poll interval must be greater than 0".to_string()));
        }
        if self.explorer.page_limit == 0 {
            return Err(Error::Config("Explorer page limit must be greater than 0".to_string()));
        }
        if self.gas_limit == 0 {
            return Err(Error::Config("Gas limit must be greater than 0".to_string()));
        }

        Ok(())
    }

    pub fn executor_address(&self) -> Result<Address, Error> {
        Address::from_str(&self.executor_address)
            .map_err(|e| Error::Config(format!("Invalid executor address {}: {}", self.executor_address, e)))
    }

    pub fn rpc_url(&self) -> Result<Url, Error> {
        Url::parse(&self.rpc_url)
            .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", self.rpc_url, e)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, Error>
where
    T::Err: fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {} value {:?}: {}", key, v, e))),
        None => Ok(default),
    }
}
