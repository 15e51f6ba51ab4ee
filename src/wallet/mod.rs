//! Single-key wallet
//!
//! The wallet file holds the WIF key, its P2PKH address and the coins seen at
//! the last sync:
//!
//! ```json
//! { "privkey": "...", "address": "X...", "utxos": [ { "txid", "vout", "script", "satoshis" } ] }
//! ```
//!
//! Coins are only refreshed by [`WalletManager::sync`]; nothing here tracks
//! spends made by later commands.

pub mod key;

pub use key::WalletKey;

use bitcoin::transaction::Version;
use bitcoin::{absolute, Amount, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult, ValidationError};
use crate::inscription::grammar::DUST_THRESHOLD;
use crate::network::{DashAddress, DashNetwork};
use crate::rpc::CoinSource;
use crate::store::StateStore;
use crate::types::{total_amount, Coin, SignedTransaction};

/// Flat fee reserved by a send
pub const SEND_FEE: u64 = 1000;

/// Fee charged per input by a split
pub const SPLIT_FEE_PER_INPUT: u64 = 1000;

/// Persisted wallet state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub privkey: String,
    pub address: String,
    pub utxos: Vec<Coin>,
}

impl Wallet {
    /// Fresh wallet around a random key
    pub fn generate(network: DashNetwork) -> Self {
        let key = WalletKey::generate(network);
        Self {
            privkey: key.to_wif(),
            address: key.address().to_string(),
            utxos: Vec::new(),
        }
    }

    pub fn key(&self, network: DashNetwork) -> AppResult<WalletKey> {
        WalletKey::from_wif(&self.privkey, network)
    }

    pub fn address(&self, network: DashNetwork) -> AppResult<DashAddress> {
        DashAddress::parse(&self.address, network)
    }

    /// Sum of cached coins
    pub fn balance(&self) -> u64 {
        total_amount(&self.utxos)
    }
}

/// Wallet operations over a state store
pub struct WalletManager {
    store: Arc<dyn StateStore<Wallet>>,
    network: DashNetwork,
}

impl WalletManager {
    pub fn new(store: Arc<dyn StateStore<Wallet>>, network: DashNetwork) -> Self {
        Self { store, network }
    }

    pub fn network(&self) -> DashNetwork {
        self.network
    }

    /// Generate and persist a new wallet; refuses to overwrite an existing one
    pub fn create(&self) -> AppResult<Wallet> {
        if self.store.exists()? {
            return Err(AppError::Wallet("wallet already exists".to_string()));
        }
        let wallet = Wallet::generate(self.network);
        self.store.save(&wallet)?;
        info!("Created wallet {} at {}", wallet.address, self.store.location());
        Ok(wallet)
    }

    pub fn load(&self) -> AppResult<Wallet> {
        self.store.load()?.ok_or_else(|| {
            AppError::Wallet(format!(
                "no wallet at {}, create one with `wallet new`",
                self.store.location()
            ))
        })
    }

    /// Replace cached coins with the node's current view
    pub async fn sync(&self, source: &dyn CoinSource) -> AppResult<Wallet> {
        let mut wallet = self.load()?;
        let address = wallet.address(self.network)?;
        info!("Syncing coins for {} with the node", address);

        wallet.utxos = source.list_unspent(&address).await?;
        self.store.save(&wallet)?;
        debug!("Stored {} coin(s)", wallet.utxos.len());
        Ok(wallet)
    }

    /// Signed payment of `amount` duffs to `to` from cached coins
    pub fn send(&self, to: &DashAddress, amount: u64) -> AppResult<SignedTransaction> {
        let wallet = self.load()?;
        build_send_transaction(&wallet.key(self.network)?, &wallet.utxos, to, amount)
    }

    /// Signed split of every cached coin into `count` outputs
    pub fn split(&self, count: usize) -> AppResult<SignedTransaction> {
        let wallet = self.load()?;
        build_split_transaction(&wallet.key(self.network)?, &wallet.utxos, count)
    }
}

/// Pay `amount` to `to`, taking coins in listed order until the amount plus
/// [`SEND_FEE`] is covered
///
/// Change goes back to the wallet when it clears dust.
pub fn build_send_transaction(
    key: &WalletKey,
    coins: &[Coin],
    to: &DashAddress,
    amount: u64,
) -> AppResult<SignedTransaction> {
    if total_amount(coins) == 0 {
        return Err(AppError::Wallet("no funds to send".to_string()));
    }
    if amount == 0 {
        return Err(AppError::InvalidData("amount required".to_string()));
    }

    let required = amount + SEND_FEE;
    let mut selected = Vec::new();
    let mut total = 0u64;
    for coin in coins {
        selected.push(coin);
        total += coin.amount;
        if total >= required {
            break;
        }
    }
    if total < required {
        return Err(AppError::InsufficientFunds {
            needed: required,
            available: total,
        });
    }

    let mut outputs = vec![TxOut {
        value: Amount::from_sat(amount),
        script_pubkey: to.script_pubkey(),
    }];
    let change = total - amount - SEND_FEE;
    if change >= DUST_THRESHOLD {
        outputs.push(TxOut {
            value: Amount::from_sat(change),
            script_pubkey: key.address().script_pubkey(),
        });
    }

    let signed = sign_p2pkh(key, &selected, outputs)?;
    info!(
        "Built send {} of {} duffs to {} from {} input(s)",
        signed.txid,
        amount,
        to,
        selected.len()
    );
    Ok(signed)
}

/// Spend every coin into `count` equal outputs to the wallet's own address
///
/// [`SPLIT_FEE_PER_INPUT`] is charged per input; the last output takes the
/// rounding remainder.
pub fn build_split_transaction(
    key: &WalletKey,
    coins: &[Coin],
    count: usize,
) -> AppResult<SignedTransaction> {
    let total = total_amount(coins);
    if total == 0 {
        return Err(AppError::Wallet("no funds to split".to_string()));
    }
    if count == 0 {
        return Err(AppError::InvalidData(
            "split count must be at least 1".to_string(),
        ));
    }

    let fee = SPLIT_FEE_PER_INPUT * coins.len() as u64;
    if total <= fee {
        return Err(AppError::InsufficientFunds {
            needed: fee + 1,
            available: total,
        });
    }

    let spendable = total - fee;
    let share = spendable / count as u64;
    if share < DUST_THRESHOLD {
        return Err(ValidationError::DustOutput {
            amount: share as i64,
            dust: DUST_THRESHOLD,
        }
        .into());
    }

    let script = key.address().script_pubkey();
    let mut outputs: Vec<TxOut> = (0..count - 1)
        .map(|_| TxOut {
            value: Amount::from_sat(share),
            script_pubkey: script.clone(),
        })
        .collect();
    outputs.push(TxOut {
        value: Amount::from_sat(spendable - share * (count as u64 - 1)),
        script_pubkey: script,
    });

    let selected: Vec<&Coin> = coins.iter().collect();
    let signed = sign_p2pkh(key, &selected, outputs)?;
    info!(
        "Built split {} of {} duffs into {} output(s)",
        signed.txid, spendable, count
    );
    Ok(signed)
}

/// Sign each input over the locking script cached with its coin
fn sign_p2pkh(key: &WalletKey, coins: &[&Coin], output: Vec<TxOut>) -> AppResult<SignedTransaction> {
    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: coins
            .iter()
            .map(|coin| TxIn {
                previous_output: coin.outpoint(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            })
            .collect(),
        output,
    };

    let signatures = coins
        .iter()
        .enumerate()
        .map(|(index, coin)| key.sign_input(&tx, index, &coin.script_pubkey))
        .collect::<AppResult<Vec<_>>>()?;
    for (input, signature) in tx.input.iter_mut().zip(signatures) {
        input.script_sig = key.p2pkh_script_sig(signature)?;
    }

    Ok(SignedTransaction::from(&tx))
}
