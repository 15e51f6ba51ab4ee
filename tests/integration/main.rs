//! Integration Tests
//!
//! End-to-end flows over the in-process node: mint and decode, interrupted
//! broadcasts resumed from the pending queue file, and wallet payments.

#[path = "../common/mod.rs"]
mod common;

mod mint_pipeline;
mod pending_queue;
mod wallet_flow;
