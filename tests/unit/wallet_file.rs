//! Wallet file layout and lifecycle over a JSON file store

use darinals::errors::AppError;
use darinals::network::DashNetwork;
use darinals::rpc::MemoryNode;
use darinals::store::JsonFileStore;
use darinals::wallet::{Wallet, WalletManager};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::coin_for;

fn manager(dir: &TempDir) -> WalletManager {
    WalletManager::new(
        Arc::new(JsonFileStore::<Wallet>::pretty(dir.path().join(".wallet.json"))),
        DashNetwork::Mainnet,
    )
}

#[test]
fn test_create_writes_expected_fields_and_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);

    let wallet = manager.create().unwrap();
    let raw: Value =
        serde_json::from_slice(&std::fs::read(dir.path().join(".wallet.json")).unwrap()).unwrap();
    assert_eq!(raw["privkey"], wallet.privkey.as_str());
    assert_eq!(raw["address"], wallet.address.as_str());
    assert_eq!(raw["utxos"], Value::Array(vec![]));

    let err = manager.create().unwrap_err();
    assert!(matches!(err, AppError::Wallet(ref m) if m == "wallet already exists"));
}

#[test]
fn test_load_without_wallet_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(manager(&dir).load(), Err(AppError::Wallet(_))));
}

#[tokio::test]
async fn test_sync_replaces_cached_coins() {
    let dir = TempDir::new().unwrap();
    let manager = manager(&dir);
    let wallet = manager.create().unwrap();
    let key = wallet.key(DashNetwork::Mainnet).unwrap();

    let node = MemoryNode::new();
    node.fund(&key.address(), coin_for(&key, 1, 40_000));
    node.fund(&key.address(), coin_for(&key, 2, 2_500));

    let synced = manager.sync(&node).await.unwrap();
    assert_eq!(synced.balance(), 42_500);

    let raw: Value =
        serde_json::from_slice(&std::fs::read(dir.path().join(".wallet.json")).unwrap()).unwrap();
    let utxo = &raw["utxos"][0];
    assert_eq!(utxo["satoshis"], 40_000);
    assert_eq!(utxo["vout"], 1);
    assert!(utxo["script"].as_str().unwrap().starts_with("76a914"));
    assert!(utxo["txid"].is_string());

    assert_eq!(manager.load().unwrap().balance(), 42_500);
}
