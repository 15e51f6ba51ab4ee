//! Dash commit/reveal inscriptions
//!
//! Content is embedded in the unlocking script of a P2SH spend: a commit
//! transaction locks funds to a redeem script derived from the wallet key and
//! the chunk count, and the reveal spends it while pushing the envelope
//! (`"ord"`, content type, body chunks) ahead of the signature.

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod errors;
pub mod inscription;
pub mod minter;
pub mod network;
pub mod rpc;
pub mod server;
pub mod store;
pub mod types;
pub mod utils;
pub mod wallet;
