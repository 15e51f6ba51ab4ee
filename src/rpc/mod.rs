//! Dash Core RPC integration module
//!
//! - **Client** - [`NodeRpcClient`], async wrapper around the synchronous `corepc-client`
//! - **Cache** - decoded unlocking scripts keyed by txid
//! - **Retry** - exponential backoff and timeout wrappers
//! - **Memory** - in-process node used by tests
//!
//! The rest of the crate talks to the node only through the collaborator
//! traits below, so every pipeline can run against [`MemoryNode`].

pub mod cache;
pub mod client;
pub mod memory;
pub mod retry;

use async_trait::async_trait;
use bitcoin::Txid;

use crate::errors::{AppResult, RpcResult};
use crate::network::DashAddress;
use crate::types::Coin;

// Re-export main types
pub use cache::{CacheStats, ScriptCache, DEFAULT_CACHE_CAPACITY};
pub use client::NodeRpcClient;
pub use memory::MemoryNode;
pub use retry::{calculate_next_backoff, execute_with_timeout, retry_with_backoff, RetryPolicy};

/// Source of spendable coins for an address
#[async_trait]
pub trait CoinSource: Send + Sync {
    /// Confirmed and unconfirmed unspent outputs paying `address`
    async fn list_unspent(&self, address: &DashAddress) -> RpcResult<Vec<Coin>>;
}

/// Sink accepting raw transactions
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submit a serialised transaction; returns the txid reported by the node
    ///
    /// Node rejections surface as [`RpcError::CallFailed`](crate::errors::RpcError::CallFailed)
    /// with the reason text untouched.
    async fn send_raw_transaction(&self, hex: &str) -> RpcResult<String>;
}

/// Lookup of mined or mempool transactions, used by the decoder
#[async_trait]
pub trait TransactionLookup: Send + Sync {
    /// Unlocking script bytes of input `input_index` of `txid`
    ///
    /// Fails with `DecodeError::NoInputs` when the transaction has no such
    /// input and `DecodeError::MissingScriptSig` when it carries no script.
    async fn input_script(&self, txid: &Txid, input_index: usize) -> AppResult<Vec<u8>>;
}
