use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::network::DashNetwork;
use crate::rpc::{RetryPolicy, DEFAULT_CACHE_CAPACITY};

/// Application configuration loaded from darinals.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub node_rpc: NodeRpcConfig,
    pub network: DashNetwork,
    pub wallet: WalletConfig,
    pub inscription: InscriptionConfig,
    pub broadcast: BroadcastConfig,
    pub server: ServerConfig,
}

/// Dash Core RPC endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRpcConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl Default for NodeRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9998".to_string(),
            username: "dash".to_string(),
            password: "password".to_string(),
            timeout_seconds: 60,
            max_retries: 5,
            initial_backoff_ms: 100,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 10,
        }
    }
}

impl NodeRpcConfig {
    /// Backoff policy for read calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_backoff_seconds: self.max_backoff_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub path: PathBuf,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".wallet.json"),
        }
    }
}

/// Fees and amounts in duffs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionConfig {
    pub commit_fee: u64,
    pub reveal_fee: u64,
    pub inscription_amount: u64,
    /// Wait between commit and reveal submission
    pub propagation_delay_ms: u64,
}

impl Default for InscriptionConfig {
    fn default() -> Self {
        Self {
            commit_fee: 2000,
            reveal_fee: 1000,
            inscription_amount: 15_000,
            propagation_delay_ms: 2000,
        }
    }
}

/// Pending queue location and node rejection patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    pub pending_path: PathBuf,
    pub retry_interval_ms: u64,
    /// Substrings of a node rejection that warrant resubmitting
    pub transient_patterns: Vec<String>,
    /// Substrings of a node rejection meaning the transaction is already known
    pub already_applied_patterns: Vec<String>,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            pending_path: PathBuf::from("pending-txs.json"),
            retry_interval_ms: 1000,
            transient_patterns: vec!["too-long-mempool-chain".to_string()],
            already_applied_patterns: vec![
                "bad-txns-inputs-spent".to_string(),
                "already in block chain".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Decoded scripts kept in memory; the oldest entry is evicted first
    pub cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_rpc: NodeRpcConfig::default(),
            network: DashNetwork::default(),
            wallet: WalletConfig::default(),
            inscription: InscriptionConfig::default(),
            broadcast: BroadcastConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from darinals.toml and environment variables
    ///
    /// Precedence, lowest first: built-in defaults, `darinals.toml`,
    /// `DARINALS_*` variables (`__` separates sections), then the short
    /// legacy names such as `NODE_RPC_URL` and `WALLET`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("darinals")
    }

    /// Same as [`AppConfig::load`] with an explicit config file stem
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let rpc = &defaults.node_rpc;
        let inscription = &defaults.inscription;
        let broadcast = &defaults.broadcast;

        let config = Config::builder()
            // Node RPC defaults
            .set_default("node_rpc.url", rpc.url.clone())?
            .set_default("node_rpc.username", rpc.username.clone())?
            .set_default("node_rpc.password", rpc.password.clone())?
            .set_default("node_rpc.timeout_seconds", rpc.timeout_seconds)?
            .set_default("node_rpc.max_retries", i64::from(rpc.max_retries))?
            .set_default("node_rpc.initial_backoff_ms", rpc.initial_backoff_ms)?
            .set_default("node_rpc.backoff_multiplier", rpc.backoff_multiplier)?
            .set_default("node_rpc.max_backoff_seconds", rpc.max_backoff_seconds)?
            .set_default("network", defaults.network.to_string())?
            .set_default(
                "wallet.path",
                defaults.wallet.path.to_string_lossy().to_string(),
            )?
            // Inscription amounts
            .set_default("inscription.commit_fee", inscription.commit_fee)?
            .set_default("inscription.reveal_fee", inscription.reveal_fee)?
            .set_default(
                "inscription.inscription_amount",
                inscription.inscription_amount,
            )?
            .set_default(
                "inscription.propagation_delay_ms",
                inscription.propagation_delay_ms,
            )?
            // Broadcast queue
            .set_default(
                "broadcast.pending_path",
                broadcast.pending_path.to_string_lossy().to_string(),
            )?
            .set_default("broadcast.retry_interval_ms", broadcast.retry_interval_ms)?
            .set_default(
                "broadcast.transient_patterns",
                broadcast.transient_patterns.clone(),
            )?
            .set_default(
                "broadcast.already_applied_patterns",
                broadcast.already_applied_patterns.clone(),
            )?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "server.cache_capacity",
                defaults.server.cache_capacity as u64,
            )?
            // Load from darinals.toml if it exists
            .add_source(File::with_name(file_stem).required(false))
            // DARINALS_NODE_RPC__URL, DARINALS_INSCRIPTION__COMMIT_FEE, ...
            .add_source(
                Environment::with_prefix("DARINALS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.apply_legacy_env()?;
        Ok(app_config)
    }

    /// Short variable names understood by earlier deployments
    fn apply_legacy_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("NODE_RPC_URL") {
            self.node_rpc.url = url;
        }
        if let Ok(user) = env::var("NODE_RPC_USER") {
            self.node_rpc.username = user;
        }
        if let Ok(pass) = env::var("NODE_RPC_PASS") {
            self.node_rpc.password = pass;
        }
        if let Ok(path) = env::var("WALLET") {
            self.wallet.path = PathBuf::from(path);
        }
        if let Some(fee) = parse_env("COMMIT_FEE_SATOSHIS")? {
            self.inscription.commit_fee = fee;
        }
        if let Some(fee) = parse_env("REVEAL_FEE_SATOSHIS")? {
            self.inscription.reveal_fee = fee;
        }
        if let Some(amount) = parse_env("INSCRIPTION_AMOUNT_SATOSHIS")? {
            self.inscription.inscription_amount = amount;
        }
        if let Some(port) = parse_env("SERVER_PORT")? {
            self.server.port = port;
        }
        Ok(())
    }

    /// Get config for CLI argument defaults, falling back to built-ins
    pub fn get_defaults() -> Self {
        Self::load().unwrap_or_default()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Message(format!("{} is not a valid number: {}", name, value))),
        Err(_) => Ok(None),
    }
}
