//! Pending queue persisted to a JSON file between runs

use darinals::broadcast::Submission;
use darinals::errors::{AppError, BroadcastError};
use darinals::network::DashNetwork;
use darinals::store::{JsonFileStore, StateStore};
use darinals::wallet::{build_send_transaction, build_split_transaction, WalletKey};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{coin_for, funded_node, sequencer};

/// Two dependent wallet transactions: a split, then a payment from its first output
fn chained_transactions(key: &WalletKey) -> Vec<String> {
    let split = build_split_transaction(key, &[coin_for(key, 1, 30_000)], 2).unwrap();
    let first_output = darinals::types::Coin {
        txid: split.txid,
        vout: 0,
        script_pubkey: key.address().script_pubkey(),
        amount: 14_500,
    };
    let destination = WalletKey::generate(DashNetwork::Mainnet).address();
    let send = build_send_transaction(key, &[first_output], &destination, 5_000).unwrap();
    vec![split.hex, send.hex]
}

#[tokio::test]
async fn test_fatal_rejection_persists_remaining_and_resume_clears() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pending-txs.json");
    let (key, node) = funded_node(&[]);
    let txs = chained_transactions(&key);

    node.reject_next("mandatory-script-verify-flag-failed");
    let store: Arc<JsonFileStore<Vec<String>>> = Arc::new(JsonFileStore::new(&path));
    let err = sequencer(node.clone(), store.clone())
        .broadcast_all(&txs, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Broadcast(BroadcastError::Unrecoverable { index: 1, total: 2, .. })
    ));
    assert!(err.to_string().contains("re-run to reattempt broadcast"));

    let on_disk: Vec<String> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, txs);

    // A later run picks the queue up from the same file
    let store: Arc<JsonFileStore<Vec<String>>> = Arc::new(JsonFileStore::new(&path));
    let next_run = sequencer(node.clone(), store.clone());
    assert!(next_run.has_pending().unwrap());
    let resumed = next_run.resume_pending().await.unwrap().unwrap();

    assert_eq!(resumed.len(), 2);
    assert!(resumed.iter().all(|s| matches!(s, Submission::Accepted(_))));
    assert!(!path.exists());
    assert_eq!(node.accepted(), txs);
}

#[tokio::test]
async fn test_resume_skips_transactions_the_node_already_has() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pending-txs.json");
    let (key, node) = funded_node(&[]);
    let txs = chained_transactions(&key);

    // First transaction went out before the previous run stopped
    let store: Arc<JsonFileStore<Vec<String>>> = Arc::new(JsonFileStore::new(&path));
    sequencer(node.clone(), store.clone())
        .broadcast_all(&txs[..1], false)
        .await
        .unwrap();
    store.save(&txs).unwrap();

    let resumed = sequencer(node.clone(), store.clone())
        .resume_pending()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resumed[0], Submission::AlreadyApplied);
    assert!(matches!(resumed[1], Submission::Accepted(_)));
    assert!(!store.exists().unwrap());
}

#[tokio::test]
async fn test_nothing_pending() {
    let dir = TempDir::new().unwrap();
    let (_, node) = funded_node(&[]);
    let store: Arc<JsonFileStore<Vec<String>>> =
        Arc::new(JsonFileStore::new(dir.path().join("pending-txs.json")));

    let sequencer = sequencer(node.clone(), store);
    assert!(!sequencer.has_pending().unwrap());
    assert!(sequencer.resume_pending().await.unwrap().is_none());
    assert_eq!(node.submissions(), 0);
}

#[tokio::test]
async fn test_transient_rejection_is_not_retried_without_retry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pending-txs.json");
    let (key, node) = funded_node(&[]);
    let txs = chained_transactions(&key);

    node.reject_next("too-long-mempool-chain");
    let store: Arc<JsonFileStore<Vec<String>>> = Arc::new(JsonFileStore::new(&path));
    let err = sequencer(node.clone(), store)
        .broadcast_all(&txs, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Broadcast(BroadcastError::Unrecoverable { index: 1, .. })
    ));
    assert_eq!(node.submissions(), 1);
    assert!(path.exists());
}
