//! Shared wiring for every command: configuration plus the collaborators built from it

use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::broadcast::{BroadcastPatterns, Sequencer};
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::minter::Minter;
use crate::network::DashNetwork;
use crate::rpc::NodeRpcClient;
use crate::store::JsonFileStore;
use crate::wallet::{Wallet, WalletManager};

/// Node and config overrides accepted by every command
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Dash Core RPC URL (overrides darinals.toml)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Dash Core RPC username (overrides darinals.toml)
    #[arg(long, global = true)]
    pub rpc_username: Option<String>,

    /// Dash Core RPC password (overrides darinals.toml)
    #[arg(long, global = true)]
    pub rpc_password: Option<String>,

    /// Network: mainnet or testnet
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Config file stem to read instead of `darinals`
    #[arg(long, global = true)]
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Layered configuration with command-line overrides applied last
    pub fn load_config(&self) -> AppResult<AppConfig> {
        let loaded = match &self.config {
            Some(stem) => AppConfig::load_from(stem),
            None => AppConfig::load(),
        };
        let mut config = loaded.map_err(|e| AppError::Config(e.to_string()))?;
        self.apply(&mut config)?;
        Ok(config)
    }

    fn apply(&self, config: &mut AppConfig) -> AppResult<()> {
        if let Some(url) = &self.rpc_url {
            config.node_rpc.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            config.node_rpc.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            config.node_rpc.password = password.clone();
        }
        if let Some(network) = &self.network {
            config.network = network.parse::<DashNetwork>()?;
        }
        Ok(())
    }
}

/// Configuration and node client for one invocation
pub struct Context {
    pub config: AppConfig,
    pub node: Arc<NodeRpcClient>,
}

impl Context {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        debug!("Using node at {} ({})", config.node_rpc.url, config.network);
        let node = Arc::new(NodeRpcClient::new(config.node_rpc.clone())?);
        Ok(Self { config, node })
    }

    pub fn network(&self) -> DashNetwork {
        self.config.network
    }

    /// Sequencer over the node and the pending queue file
    pub fn sequencer(&self) -> Sequencer {
        let broadcast = &self.config.broadcast;
        Sequencer::new(
            self.node.clone(),
            Arc::new(JsonFileStore::<Vec<String>>::new(
                broadcast.pending_path.clone(),
            )),
            BroadcastPatterns::from_config(broadcast),
        )
        .with_retry_interval(Duration::from_millis(broadcast.retry_interval_ms))
        .with_propagation_delay(Duration::from_millis(
            self.config.inscription.propagation_delay_ms,
        ))
    }

    pub fn wallet_manager(&self) -> WalletManager {
        WalletManager::new(
            Arc::new(JsonFileStore::<Wallet>::pretty(
                self.config.wallet.path.clone(),
            )),
            self.network(),
        )
    }

    /// Minter signing with the wallet's key
    pub fn minter(&self) -> AppResult<Minter> {
        let wallet = self.wallet_manager().load()?;
        Ok(Minter::new(
            wallet.key(self.network())?,
            self.node.clone(),
            self.sequencer(),
            self.config.inscription.clone(),
        ))
    }
}
