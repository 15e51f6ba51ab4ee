//! Shared types used across the commit/reveal pipeline
//!
//! - `Coin`: an unspent output owned by the wallet, as stored in the wallet file
//!   and as returned by the node's `listunspent`
//! - `SignedTransaction`: a serialised transaction ready for broadcast

use bitcoin::{consensus, OutPoint, ScriptBuf, Transaction, Txid};
use serde::{Deserialize, Serialize};

/// Duffs per DASH
pub const DUFFS_PER_DASH: f64 = 100_000_000.0;

/// Unspent output available for funding
///
/// Field names match the wallet file layout (`txid`, `vout`, `script`, `satoshis`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub txid: Txid,
    pub vout: u32,
    #[serde(rename = "script")]
    pub script_pubkey: ScriptBuf,
    #[serde(rename = "satoshis")]
    pub amount: u64,
}

impl Coin {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }
}

/// Convert a node-reported DASH amount to duffs
pub fn dash_to_duffs(amount: f64) -> u64 {
    (amount * DUFFS_PER_DASH).round() as u64
}

/// Total value of a coin list
pub fn total_amount(coins: &[Coin]) -> u64 {
    coins.iter().map(|coin| coin.amount).sum()
}

/// Fully signed transaction with its id and wire encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub txid: Txid,
    pub hex: String,
}

impl From<&Transaction> for SignedTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            txid: tx.compute_txid(),
            hex: consensus::encode::serialize_hex(tx),
        }
    }
}
