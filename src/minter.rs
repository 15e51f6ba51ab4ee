//! Mint pipeline
//!
//! Validate, build the commit, build the reveal from the commit's outputs and
//! only then broadcast both. Every validation failure, including dust and
//! unlocking-script size, therefore surfaces before anything reaches the
//! network, and a failed broadcast leaves every unsent transaction of the mint
//! in the pending queue.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::broadcast::Sequencer;
use crate::config::InscriptionConfig;
use crate::errors::{AppResult, ValidationError};
use crate::inscription::content_type;
use crate::inscription::grammar::{chunk_count, MAX_CONTENT_SIZE, MAX_SCRIPT_ELEMENT_SIZE};
use crate::inscription::{
    build_commit, build_reveal, CommitOutpoint, CommitParams, CommitTransaction, RevealRequest,
    RevealTransaction,
};
use crate::network::DashAddress;
use crate::rpc::CoinSource;
use crate::types::Coin;
use crate::wallet::WalletKey;

/// Content type and payload of one inscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintContent {
    pub content_type: String,
    pub payload: Vec<u8>,
}

impl MintContent {
    pub fn new(content_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            payload,
        }
    }

    /// Build content from command-line arguments
    ///
    /// When `content_type_or_file` names an existing file its bytes are the
    /// payload and its content type is resolved from the name and contents.
    /// Otherwise it is the content type and `hex_data` holds the payload.
    pub fn from_args(content_type_or_file: &str, hex_data: Option<&str>) -> AppResult<Self> {
        let path = Path::new(content_type_or_file);
        if path.is_file() {
            let payload = std::fs::read(path)?;
            let content_type = content_type::resolve(path, &payload);
            return Ok(Self::new(content_type, payload));
        }

        let hex_data = hex_data.unwrap_or_default();
        if !hex_data.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidHex.into());
        }
        let payload = hex::decode(hex_data).map_err(|_| ValidationError::InvalidHex)?;
        Ok(Self::new(content_type_or_file, payload))
    }

    /// Size rules checked before any coin is selected
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.payload.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if self.content_type.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ValidationError::ContentTypeTooLong {
                len: self.content_type.len(),
                max: MAX_SCRIPT_ELEMENT_SIZE,
            });
        }
        if self.payload.len() > MAX_CONTENT_SIZE {
            return Err(ValidationError::ContentTooLarge {
                len: self.payload.len(),
                max: MAX_CONTENT_SIZE,
            });
        }
        Ok(())
    }
}

/// Both transactions of a mint, signed and not yet broadcast
#[derive(Debug, Clone)]
pub struct PreparedMint {
    pub commit: CommitTransaction,
    pub reveal: RevealTransaction,
}

impl PreparedMint {
    pub fn inscription_id(&self) -> String {
        self.reveal.inscription_id()
    }

    /// Broadcast order
    pub fn raw_transactions(&self) -> Vec<String> {
        vec![
            self.commit.transaction.hex.clone(),
            self.reveal.transaction.hex.clone(),
        ]
    }
}

/// Build commit and reveal for `content` from `coins`
pub fn prepare_mint(
    key: &WalletKey,
    coins: &[Coin],
    destination: &DashAddress,
    content: &MintContent,
    amounts: &InscriptionConfig,
) -> AppResult<PreparedMint> {
    content.validate()?;

    info!("Building commit transaction");
    let commit = build_commit(
        key,
        coins,
        &CommitParams {
            inscription_amount: amounts.inscription_amount,
            commit_fee: amounts.commit_fee,
            chunk_count: chunk_count(content.payload.len()),
        },
    )?;

    info!("Building reveal transaction");
    let reveal = build_reveal(
        key,
        &CommitOutpoint {
            txid: commit.transaction.txid,
            vout: commit.p2sh_output_index,
            amount: commit.p2sh_amount,
        },
        &commit.redeem_script,
        &RevealRequest {
            content_type: &content.content_type,
            payload: &content.payload,
            destination,
            reveal_fee: amounts.reveal_fee,
        },
    )?;

    Ok(PreparedMint { commit, reveal })
}

/// Mint orchestration over the node collaborators
pub struct Minter {
    key: WalletKey,
    coins: Arc<dyn CoinSource>,
    sequencer: Sequencer,
    amounts: InscriptionConfig,
}

impl Minter {
    pub fn new(
        key: WalletKey,
        coins: Arc<dyn CoinSource>,
        sequencer: Sequencer,
        amounts: InscriptionConfig,
    ) -> Self {
        Self {
            key,
            coins,
            sequencer,
            amounts,
        }
    }

    /// Inscribe `content` and send it to `destination`
    ///
    /// Coins are read fresh from the node. Commit and reveal go out in one
    /// sequence without transient retries; the sequencer waits the configured
    /// propagation delay between them.
    pub async fn mint(
        &self,
        destination: &DashAddress,
        content: &MintContent,
    ) -> AppResult<PreparedMint> {
        // Before any coin is read from the node
        content.validate()?;

        let coins = self.coins.list_unspent(&self.key.address()).await?;
        let prepared = prepare_mint(&self.key, &coins, destination, content, &self.amounts)?;

        self.sequencer
            .broadcast_all(&prepared.raw_transactions(), false)
            .await?;
        info!(
            "Minted {} ({} bytes, {})",
            prepared.inscription_id(),
            content.payload.len(),
            content.content_type
        );
        Ok(prepared)
    }
}
