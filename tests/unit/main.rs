//! Unit tests over the public API
//!
//! Each module targets one component through its exported surface; the
//! in-crate `#[cfg(test)]` modules cover private helpers.

#[path = "../common/mod.rs"]
mod common;

mod addresses;
mod envelope;
mod wallet_file;
