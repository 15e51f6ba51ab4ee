//! In-process node
//!
//! Implements every collaborator trait over plain maps so the mint, wallet
//! and decode paths can be exercised without a running Dash Core. Accepted
//! transactions become visible to [`TransactionLookup`] and spend the coins
//! they consume; their outputs are not added back as coins.

use async_trait::async_trait;
use bitcoin::consensus::encode::deserialize_hex;
use bitcoin::{Transaction, Txid};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::errors::{AppResult, DecodeError, RpcError, RpcResult};
use crate::network::DashAddress;
use crate::rpc::{Broadcaster, CoinSource, TransactionLookup};
use crate::types::Coin;

#[derive(Default)]
struct NodeState {
    coins: HashMap<String, Vec<Coin>>,
    transactions: HashMap<Txid, Transaction>,
    accepted: Vec<String>,
    /// Scripted answers for upcoming submissions; `None` accepts
    responses: VecDeque<Option<String>>,
    submissions: usize,
    lookups: usize,
}

#[derive(Default)]
pub struct MemoryNode {
    state: Mutex<NodeState>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `coin` spendable by `address`
    pub fn fund(&self, address: &DashAddress, coin: Coin) {
        self.lock()
            .coins
            .entry(address.to_string())
            .or_default()
            .push(coin);
    }

    /// Reject the next unscripted submission with `message`
    pub fn reject_next(&self, message: impl Into<String>) {
        self.lock().responses.push_back(Some(message.into()));
    }

    /// Accept the next unscripted submission normally
    pub fn accept_next(&self) {
        self.lock().responses.push_back(None);
    }

    /// Make a transaction visible to lookups without broadcasting it
    pub fn insert_transaction(&self, tx: Transaction) {
        self.lock().transactions.insert(tx.compute_txid(), tx);
    }

    /// Hex of every accepted transaction, in acceptance order
    pub fn accepted(&self) -> Vec<String> {
        self.lock().accepted.clone()
    }

    /// Number of `send_raw_transaction` calls, accepted or not
    pub fn submissions(&self) -> usize {
        self.lock().submissions
    }

    /// Number of `input_script` calls
    pub fn lookups(&self) -> usize {
        self.lock().lookups
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn rejected(message: impl Into<String>) -> RpcError {
    RpcError::CallFailed {
        method: "sendrawtransaction".to_string(),
        message: message.into(),
    }
}

#[async_trait]
impl CoinSource for MemoryNode {
    async fn list_unspent(&self, address: &DashAddress) -> RpcResult<Vec<Coin>> {
        Ok(self
            .lock()
            .coins
            .get(&address.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Broadcaster for MemoryNode {
    async fn send_raw_transaction(&self, hex: &str) -> RpcResult<String> {
        let mut state = self.lock();
        state.submissions += 1;

        if let Some(Some(message)) = state.responses.pop_front() {
            return Err(rejected(message));
        }

        let tx: Transaction =
            deserialize_hex(hex).map_err(|e| rejected(format!("TX decode failed: {}", e)))?;
        let txid = tx.compute_txid();
        if state.transactions.contains_key(&txid) {
            return Err(rejected("transaction already in block chain"));
        }

        for input in &tx.input {
            for coins in state.coins.values_mut() {
                coins.retain(|coin| coin.outpoint() != input.previous_output);
            }
        }
        state.transactions.insert(txid, tx);
        state.accepted.push(hex.to_string());
        Ok(txid.to_string())
    }
}

#[async_trait]
impl TransactionLookup for MemoryNode {
    async fn input_script(&self, txid: &Txid, input_index: usize) -> AppResult<Vec<u8>> {
        let mut state = self.lock();
        state.lookups += 1;

        let tx = state
            .transactions
            .get(txid)
            .ok_or_else(|| RpcError::TransactionNotFound {
                txid: txid.to_string(),
            })?;
        let input = tx.input.get(input_index).ok_or(DecodeError::NoInputs)?;
        if input.script_sig.is_empty() {
            return Err(DecodeError::MissingScriptSig.into());
        }
        Ok(input.script_sig.to_bytes())
    }
}
