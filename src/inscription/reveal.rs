//! Reveal transaction construction
//!
//! Spends the commit's P2SH output and publishes the content inside the
//! unlocking script. The single output pays the P2SH amount minus the reveal
//! fee to the destination, so the inscription lives at `<reveal txid>:0`.

use bitcoin::transaction::Version;
use bitcoin::{
    absolute, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use tracing::{debug, info};

use super::grammar::{
    chunk_content, compile, envelope_tokens, EnvelopeParts, DUST_THRESHOLD,
    MAX_SCRIPT_ELEMENT_SIZE, SCRIPT_SIG_MAX_SIZE,
};
use super::redeem::RedeemScript;
use crate::errors::{AppResult, ValidationError};
use crate::network::DashAddress;
use crate::types::SignedTransaction;
use crate::wallet::WalletKey;

/// Output index holding the inscription
pub const INSCRIPTION_OUTPUT_INDEX: u32 = 0;

/// Commit output being spent
#[derive(Debug, Clone)]
pub struct CommitOutpoint {
    pub txid: Txid,
    pub vout: u32,
    pub amount: u64,
}

/// Content and destination for one reveal
#[derive(Debug, Clone)]
pub struct RevealRequest<'a> {
    pub content_type: &'a str,
    pub payload: &'a [u8],
    pub destination: &'a DashAddress,
    pub reveal_fee: u64,
}

/// Signed reveal with its inscription id
#[derive(Debug, Clone)]
pub struct RevealTransaction {
    pub transaction: SignedTransaction,
    pub output_amount: u64,
    pub script_sig_len: usize,
}

impl RevealTransaction {
    /// `<reveal txid>:0`
    pub fn inscription_id(&self) -> String {
        format!("{}:{}", self.transaction.txid, INSCRIPTION_OUTPUT_INDEX)
    }
}

/// Build and sign the reveal transaction
///
/// The signature hash is computed over the redeem script, which is what the
/// interpreter executes when the P2SH input is spent.
///
/// # Errors
/// - `ChunkTooLarge` if a body chunk exceeds the script element limit
/// - `DustOutput` if P2SH amount minus fee is under the dust threshold
/// - `ScriptSigTooLarge` if the assembled unlocking script exceeds the network limit
pub fn build_reveal(
    key: &WalletKey,
    commit: &CommitOutpoint,
    redeem_script: &RedeemScript,
    request: &RevealRequest<'_>,
) -> AppResult<RevealTransaction> {
    let chunks = chunk_content(request.payload);
    if let Some(chunk) = chunks.iter().find(|c| c.len() > MAX_SCRIPT_ELEMENT_SIZE) {
        return Err(ValidationError::ChunkTooLarge {
            len: chunk.len(),
            max: MAX_SCRIPT_ELEMENT_SIZE,
        }
        .into());
    }
    debug!(
        "Split {} byte payload into {} chunk(s)",
        request.payload.len(),
        chunks.len()
    );

    let output_amount = commit.amount as i64 - request.reveal_fee as i64;
    if output_amount < DUST_THRESHOLD as i64 {
        return Err(ValidationError::DustOutput {
            amount: output_amount,
            dust: DUST_THRESHOLD,
        }
        .into());
    }
    let output_amount = output_amount as u64;

    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: commit.txid,
                vout: commit.vout,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(output_amount),
            script_pubkey: request.destination.script_pubkey(),
        }],
    };

    let signature = key.sign_input(&tx, 0, &redeem_script.script)?;

    let script_sig = compile(&envelope_tokens(&EnvelopeParts {
        content_type: request.content_type.as_bytes(),
        chunks,
        signature: &signature,
        redeem_script: redeem_script.as_bytes(),
    }))?;

    if script_sig.len() > SCRIPT_SIG_MAX_SIZE {
        return Err(ValidationError::ScriptSigTooLarge {
            len: script_sig.len(),
            max: SCRIPT_SIG_MAX_SIZE,
        }
        .into());
    }

    let script_sig_len = script_sig.len();
    tx.input[0].script_sig = script_sig;

    let transaction = SignedTransaction::from(&tx);
    info!(
        "Built reveal {} ({} byte scriptSig) paying {} duffs to {}",
        transaction.txid, script_sig_len, output_amount, request.destination
    );

    Ok(RevealTransaction {
        transaction,
        output_amount,
        script_sig_len,
    })
}
