//! Commit/reveal inscription protocol
//!
//! - **grammar** - constants, token model and the envelope layout shared by both directions
//! - **redeem** - redeem script locking the commit output
//! - **selector** - funding coin selection
//! - **commit** / **reveal** - the two transactions of a mint
//! - **extract** - decoding a reveal back into content type and body
//! - **content_type** / **token** - payload helpers for the CLI

pub mod commit;
pub mod content_type;
pub mod extract;
pub mod grammar;
pub mod redeem;
pub mod reveal;
pub mod selector;
pub mod token;

pub use commit::{build_commit, CommitParams, CommitTransaction};
pub use extract::{extract, extract_from_script_sig, Inscription};
pub use redeem::RedeemScript;
pub use reveal::{build_reveal, CommitOutpoint, RevealRequest, RevealTransaction};
pub use selector::{select_coins, Selection};
