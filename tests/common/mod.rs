//! Common Test Utilities
//!
//! Shared setup for the unit and integration suites: funded in-process
//! nodes, sequencers over in-memory or file-backed queues, and wallet keys.

#![allow(dead_code)]

use bitcoin::hashes::Hash;
use bitcoin::Txid;
use darinals::broadcast::{BroadcastPatterns, Sequencer};
use darinals::network::DashNetwork;
use darinals::rpc::MemoryNode;
use darinals::store::{MemoryStore, StateStore};
use darinals::types::Coin;
use darinals::wallet::WalletKey;
use std::sync::Arc;
use std::time::Duration;

/// Coin paying `key`, with a txid derived from `seed`
pub fn coin_for(key: &WalletKey, seed: u8, amount: u64) -> Coin {
    Coin {
        txid: Txid::from_byte_array([seed; 32]),
        vout: u32::from(seed % 4),
        script_pubkey: key.address().script_pubkey(),
        amount,
    }
}

/// Fresh mainnet key together with a node holding one coin per amount
pub fn funded_node(amounts: &[u64]) -> (WalletKey, Arc<MemoryNode>) {
    let key = WalletKey::generate(DashNetwork::Mainnet);
    let node = Arc::new(MemoryNode::new());
    for (i, amount) in amounts.iter().enumerate() {
        node.fund(&key.address(), coin_for(&key, i as u8 + 1, *amount));
    }
    (key, node)
}

/// Sequencer without waits, persisting to `pending`
pub fn sequencer(
    node: Arc<MemoryNode>,
    pending: Arc<dyn StateStore<Vec<String>>>,
) -> Sequencer {
    Sequencer::new(node, pending, BroadcastPatterns::default())
        .with_retry_interval(Duration::ZERO)
        .with_propagation_delay(Duration::ZERO)
}

/// Sequencer over an in-memory queue, returned with the queue for inspection
pub fn memory_sequencer(node: Arc<MemoryNode>) -> (Sequencer, Arc<MemoryStore<Vec<String>>>) {
    let pending = Arc::new(MemoryStore::<Vec<String>>::new());
    (sequencer(node, pending.clone()), pending)
}
