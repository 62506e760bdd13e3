//! # Relay Configuration
//!
//! Unified configuration for every subsystem plus the runtime's own
//! endpoints. Defaults target a public test network; `load_config` overlays
//! `RELAY_*` environment variables.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `RELAY_RPC_URL` | `rpc_url` |
//! | `RELAY_DATA_DIR` | `data_dir` |
//! | `RELAY_EXPLORER_URL` | `explorer_url` |
//! | `RELAY_OWNER` | `gateway.policy.owner` |
//! | `RELAY_AUTOMATION` | `gateway.policy.automation` (comma separated) |
//! | `RELAY_STRATEGY_ROUTER` | `gateway.targets.strategy_router` |
//! | `RELAY_DAO_MANAGER` | `gateway.targets.dao_manager` |
//! | `RELAY_RISK_ENGINE` | `gateway.targets.risk_engine` |
//! | `RELAY_POLL_INTERVAL_MS` | `monitor.poll_interval` |
//! | `RELAY_MAX_POLLS` | `monitor.max_attempts` |
//! | `RELAY_HISTORY_CAPACITY` | `ledger.capacity` |

use lr_01_error_classifier::RetryPolicy;
use lr_02_transaction_ledger::LedgerConfig;
use lr_03_submission_gateway::GatewayConfig;
use lr_04_confirmation_monitor::MonitorConfig;
use serde::{Deserialize, Serialize};
use shared_types::ActorId;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://starknet-sepolia.public.blastapi.io/rpc/v0_7";

/// Default block explorer.
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.starkscan.co";

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// External ledger JSON-RPC endpoint.
    pub rpc_url: String,
    /// JSON-RPC request timeout.
    pub rpc_timeout: Duration,
    /// Directory for the persistent actor ledgers.
    pub data_dir: PathBuf,
    /// Explorer base; history entries link to `<explorer_url>/tx/<id>`.
    pub explorer_url: String,
    /// Transaction Ledger configuration.
    pub ledger: LedgerConfig,
    /// Submission Gateway configuration.
    pub gateway: GatewayConfig,
    /// Confirmation Monitor configuration.
    pub monitor: MonitorConfig,
    /// Backoff for transient RPC failures.
    pub retry: RetryPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_timeout: Duration::from_secs(10),
            data_dir: PathBuf::from("./data/ledger-relay"),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            ledger: LedgerConfig::default(),
            gateway: GatewayConfig::default(),
            monitor: MonitorConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl RelayConfig {
    /// Fast timings and test addresses.
    pub fn for_testing() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:5050".to_string(),
            rpc_timeout: Duration::from_secs(1),
            data_dir: PathBuf::from("./target/ledger-relay-test"),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            ledger: LedgerConfig::for_testing(),
            gateway: GatewayConfig::for_testing(),
            monitor: MonitorConfig::for_testing(),
            retry: RetryPolicy::for_testing(),
        }
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidRpcUrl(self.rpc_url.clone()));
        }
        if self.monitor.max_attempts == 0 {
            return Err(ConfigError::ZeroPolls);
        }
        Ok(())
    }

    /// Explorer link for a ledger id.
    pub fn explorer_link(&self, tx_id: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_id)
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The RPC endpoint is not an http(s) URL.
    #[error("RELAY_RPC_URL must be an http(s) URL, got {0:?}")]
    InvalidRpcUrl(String),

    /// A monitor that never polls can never confirm anything.
    #[error("RELAY_MAX_POLLS must be at least 1")]
    ZeroPolls,
}

/// Load configuration from the process environment.
pub fn load_config() -> RelayConfig {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from an arbitrary variable lookup.
///
/// Unparseable values are logged and ignored.
pub fn load_config_from<F>(lookup: F) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RelayConfig::default();
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(url) = var("RELAY_RPC_URL") {
        config.rpc_url = url;
    }
    if let Some(dir) = var("RELAY_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(url) = var("RELAY_EXPLORER_URL") {
        config.explorer_url = url;
    }

    if let Some(owner) = var("RELAY_OWNER") {
        info!(owner = %owner, "Loaded owner identity from environment");
        config.gateway.policy.owner = Some(ActorId::new(owner));
    }
    if let Some(list) = var("RELAY_AUTOMATION") {
        config.gateway.policy.automation = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ActorId::new)
            .collect();
    }

    if let Some(addr) = var("RELAY_STRATEGY_ROUTER") {
        config.gateway.targets.strategy_router = Some(addr);
    }
    if let Some(addr) = var("RELAY_DAO_MANAGER") {
        config.gateway.targets.dao_manager = Some(addr);
    }
    if let Some(addr) = var("RELAY_RISK_ENGINE") {
        config.gateway.targets.risk_engine = Some(addr);
    }

    if let Some(ms) = parse::<u64>(var("RELAY_POLL_INTERVAL_MS"), "RELAY_POLL_INTERVAL_MS") {
        config.monitor.poll_interval = Duration::from_millis(ms);
    }
    if let Some(n) = parse::<u32>(var("RELAY_MAX_POLLS"), "RELAY_MAX_POLLS") {
        config.monitor.max_attempts = n;
    }
    if let Some(n) = parse::<usize>(var("RELAY_HISTORY_CAPACITY"), "RELAY_HISTORY_CAPACITY") {
        config.ledger.capacity = n;
    }

    config
}

fn parse<T: FromStr>(value: Option<String>, key: &str) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %value, "Ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> RelayConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]);
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.monitor.max_attempts, 40);
        assert_eq!(config.ledger.capacity, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = load(&[
            ("RELAY_RPC_URL", "http://localhost:9545"),
            ("RELAY_OWNER", "0xOWNER"),
            ("RELAY_AUTOMATION", "0xBot1, 0xbot2,"),
            ("RELAY_POLL_INTERVAL_MS", "500"),
            ("RELAY_MAX_POLLS", "8"),
            ("RELAY_HISTORY_CAPACITY", "20"),
            ("RELAY_STRATEGY_ROUTER", "0x0a11"),
        ]);

        assert_eq!(config.rpc_url, "http://localhost:9545");
        assert_eq!(config.gateway.policy.owner, Some(ActorId::new("0xowner")));
        assert_eq!(
            config.gateway.policy.automation,
            vec![ActorId::new("0xbot1"), ActorId::new("0xbot2")]
        );
        assert_eq!(config.monitor.poll_interval, Duration::from_millis(500));
        assert_eq!(config.monitor.max_attempts, 8);
        assert_eq!(config.ledger.capacity, 20);
        assert_eq!(
            config.gateway.targets.strategy_router.as_deref(),
            Some("0x0a11")
        );
    }

    #[test]
    fn test_unparseable_values_are_ignored() {
        let config = load(&[("RELAY_MAX_POLLS", "forty"), ("RELAY_POLL_INTERVAL_MS", "")]);
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[test]
    fn test_validate() {
        let mut config = RelayConfig::for_testing();
        assert!(config.validate().is_ok());

        config.rpc_url = "localhost:5050".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRpcUrl(_))));

        config.rpc_url = "http://localhost:5050".into();
        config.monitor.max_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPolls));
    }

    #[test]
    fn test_explorer_link() {
        let mut config = RelayConfig::default();
        config.explorer_url = "https://explorer.example/".into();
        assert_eq!(
            config.explorer_link("0xabc"),
            "https://explorer.example/tx/0xabc"
        );
    }
}
