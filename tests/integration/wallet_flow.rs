//! Wallet sync and payments broadcast with transient retries

use bitcoin::consensus::encode::deserialize_hex;
use bitcoin::Transaction;
use darinals::broadcast::Submission;
use darinals::errors::AppError;
use darinals::network::DashNetwork;
use darinals::rpc::MemoryNode;
use darinals::store::MemoryStore;
use darinals::wallet::{Wallet, WalletKey, WalletManager};
use std::sync::Arc;

use crate::common::{coin_for, memory_sequencer};

/// Manager over an in-memory wallet, plus a node funding it
fn funded_wallet(amounts: &[u64]) -> (WalletManager, WalletKey, Arc<MemoryNode>) {
    let wallet = Wallet::generate(DashNetwork::Mainnet);
    let key = wallet.key(DashNetwork::Mainnet).unwrap();
    let node = Arc::new(MemoryNode::new());
    for (i, amount) in amounts.iter().enumerate() {
        node.fund(&key.address(), coin_for(&key, i as u8 + 1, *amount));
    }
    let manager = WalletManager::new(
        Arc::new(MemoryStore::with_state(wallet)),
        DashNetwork::Mainnet,
    );
    (manager, key, node)
}

#[tokio::test]
async fn test_send_survives_transient_rejection() {
    let (manager, _, node) = funded_wallet(&[20_000, 30_000]);
    manager.sync(node.as_ref()).await.unwrap();

    let to = WalletKey::generate(DashNetwork::Mainnet).address();
    let tx = manager.send(&to, 25_000).unwrap();

    node.reject_next("too-long-mempool-chain");
    let (sequencer, _) = memory_sequencer(node.clone());
    let submissions = sequencer
        .broadcast_all(std::slice::from_ref(&tx.hex), true)
        .await
        .unwrap();

    assert_eq!(submissions, vec![Submission::Accepted(tx.txid.to_string())]);
    assert_eq!(node.submissions(), 2);

    // Listed order: 20k alone is short, so both coins are spent
    let sent: Transaction = deserialize_hex(&tx.hex).unwrap();
    assert_eq!(sent.input.len(), 2);
    assert_eq!(sent.output[0].value.to_sat(), 25_000);
    assert_eq!(sent.output[0].script_pubkey, to.script_pubkey());
    assert_eq!(sent.output[1].value.to_sat(), 50_000 - 25_000 - 1_000);
}

#[tokio::test]
async fn test_send_beyond_balance() {
    let (manager, _, node) = funded_wallet(&[5_000]);
    manager.sync(node.as_ref()).await.unwrap();

    let to = WalletKey::generate(DashNetwork::Mainnet).address();
    let err = manager.send(&to, 4_500).unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientFunds {
            needed: 5_500,
            available: 5_000
        }
    ));
}

#[tokio::test]
async fn test_split_pays_wallet_in_equal_shares() {
    let (manager, key, node) = funded_wallet(&[10_000, 12_001]);
    manager.sync(node.as_ref()).await.unwrap();

    let tx = manager.split(4).unwrap();
    let split: Transaction = deserialize_hex(&tx.hex).unwrap();

    // 22_001 - 2 inputs x 1_000 = 20_001 spread over 4 outputs
    let values: Vec<u64> = split.output.iter().map(|o| o.value.to_sat()).collect();
    assert_eq!(values, vec![5_000, 5_000, 5_000, 5_001]);
    assert!(split
        .output
        .iter()
        .all(|o| o.script_pubkey == key.address().script_pubkey()));

    let (sequencer, _) = memory_sequencer(node.clone());
    sequencer
        .broadcast_all(std::slice::from_ref(&tx.hex), true)
        .await
        .unwrap();
    assert_eq!(node.accepted(), vec![tx.hex.clone()]);
}
