//! dar-20 fungible token payloads
//!
//! Deploy, mint and transfer operations are plain JSON inscriptions. Field
//! order is part of the format indexers read, so the structs below declare
//! their fields in wire order and every value is a string.

use serde::{Deserialize, Serialize};

pub const PROTOCOL: &str = "dar-20";

/// Content type for every dar-20 inscription
pub const CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    Mint,
    Transfer,
}

impl TransferOp {
    fn as_str(&self) -> &'static str {
        match self {
            TransferOp::Mint => "mint",
            TransferOp::Transfer => "transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    pub p: String,
    pub op: String,
    pub tick: String,
    pub max: String,
    pub lim: String,
}

impl Deploy {
    pub fn new(tick: &str, max: &str, lim: &str) -> Self {
        Self {
            p: PROTOCOL.to_string(),
            op: "deploy".to_string(),
            tick: tick.to_lowercase(),
            max: max.to_string(),
            lim: lim.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub p: String,
    pub op: String,
    pub tick: String,
    pub amt: String,
}

impl Transfer {
    pub fn new(op: TransferOp, tick: &str, amt: &str) -> Self {
        Self {
            p: PROTOCOL.to_string(),
            op: op.as_str().to_string(),
            tick: tick.to_lowercase(),
            amt: amt.to_string(),
        }
    }
}

/// Compact JSON bytes ready to inscribe
pub fn payload<T: Serialize>(operation: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(operation)
}
