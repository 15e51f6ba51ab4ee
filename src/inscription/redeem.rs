//! Redeem script construction
//!
//! The commit output locks coins to the hash of a script that checks one
//! signature and then drops every envelope push the reveal input carries:
//!
//! ```text
//! <pubkey> OP_CHECKSIGVERIFY OP_DROP x (chunks + 4) OP_1
//! ```

use bitcoin::{PublicKey, ScriptBuf};

use super::grammar::{compile, drop_count, redeem_script_tokens};
use crate::errors::AppResult;
use crate::network::{DashAddress, DashNetwork};

/// Redeem script for one inscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemScript {
    pub public_key: PublicKey,
    pub drop_count: usize,
    pub script: ScriptBuf,
}

impl RedeemScript {
    /// Build the redeem script for `chunk_count` body pushes
    ///
    /// `chunk_count` is validated upstream (1..=3 for a 1500 byte limit).
    pub fn new(public_key: PublicKey, chunk_count: usize) -> AppResult<Self> {
        let script = compile(&redeem_script_tokens(&public_key.to_bytes(), chunk_count))?;
        Ok(Self {
            public_key,
            drop_count: drop_count(chunk_count),
            script,
        })
    }

    /// P2SH address committing to this script
    pub fn p2sh_address(&self, network: DashNetwork) -> DashAddress {
        DashAddress::p2sh(&self.script, network)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.script.as_bytes()
    }
}
