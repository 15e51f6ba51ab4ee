//! Commit transaction construction
//!
//! Funds a P2SH output whose redeem script is the inscription's unlock
//! condition. Layout:
//!
//! - inputs: selected wallet coins, largest first
//! - output 0: P2SH, carrying the inscription amount
//! - output 1 (optional): change back to the wallet address when it clears dust

use bitcoin::transaction::Version;
use bitcoin::{absolute, Amount, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness};
use tracing::{debug, info};

use super::grammar::DUST_THRESHOLD;
use super::redeem::RedeemScript;
use super::selector::select_coins;
use crate::errors::AppResult;
use crate::network::DashAddress;
use crate::types::{Coin, SignedTransaction};
use crate::wallet::WalletKey;

/// Index of the P2SH output in every commit transaction
pub const P2SH_OUTPUT_INDEX: u32 = 0;

/// Amounts for one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitParams {
    pub inscription_amount: u64,
    pub commit_fee: u64,
    pub chunk_count: usize,
}

impl CommitParams {
    /// P2SH amount plus commit fee
    pub fn required_amount(&self) -> u64 {
        self.inscription_amount + self.commit_fee
    }
}

/// Everything the reveal phase needs from the commit
#[derive(Debug, Clone)]
pub struct CommitTransaction {
    pub transaction: SignedTransaction,
    pub p2sh_address: DashAddress,
    pub p2sh_output_index: u32,
    pub p2sh_amount: u64,
    pub redeem_script: RedeemScript,
    /// Coins spent, in input order
    pub inputs: Vec<Coin>,
    pub change: Option<u64>,
}

/// Select coins, derive the redeem script and sign the commit transaction
///
/// # Arguments
/// * `key` - wallet key; owns every coin in `available` and signs the reveal later
/// * `available` - current unspent coins of the wallet address
/// * `params` - inscription amount, commit fee and chunk count
///
/// # Errors
/// `NoCoins` / `InsufficientFunds` from selection; no transaction is built then.
pub fn build_commit(
    key: &WalletKey,
    available: &[Coin],
    params: &CommitParams,
) -> AppResult<CommitTransaction> {
    let selection = select_coins(available, params.required_amount())?;

    let redeem_script = RedeemScript::new(key.public_key(), params.chunk_count)?;
    let p2sh_address = redeem_script.p2sh_address(key.network());
    let wallet_script = key.address().script_pubkey();

    let mut output = vec![TxOut {
        value: Amount::from_sat(params.inscription_amount),
        script_pubkey: p2sh_address.script_pubkey(),
    }];

    let change_amount = selection.total - params.inscription_amount - params.commit_fee;
    let change = if change_amount >= DUST_THRESHOLD {
        output.push(TxOut {
            value: Amount::from_sat(change_amount),
            script_pubkey: wallet_script.clone(),
        });
        Some(change_amount)
    } else {
        debug!(
            "Change of {} duffs is below dust, leaving it to fees",
            change_amount
        );
        None
    };

    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: selection
            .coins
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

    // Legacy sighash blanks every other input's script, so signing before
    // filling any script_sig gives the same digests as signing in place.
    let signatures = (0..tx.input.len())
        .map(|index| key.sign_input(&tx, index, &wallet_script))
        .collect::<AppResult<Vec<_>>>()?;
    for (input, signature) in tx.input.iter_mut().zip(signatures) {
        input.script_sig = key.p2pkh_script_sig(signature)?;
    }

    let transaction = SignedTransaction::from(&tx);
    info!(
        "Built commit {} with {} input(s) locking {} duffs to {}",
        transaction.txid,
        tx.input.len(),
        params.inscription_amount,
        p2sh_address
    );

    Ok(CommitTransaction {
        transaction,
        p2sh_address,
        p2sh_output_index: P2SH_OUTPUT_INDEX,
        p2sh_amount: params.inscription_amount,
        redeem_script,
        inputs: selection.coins,
        change,
    })
}
