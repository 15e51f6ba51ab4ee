//! Mint through the sequencer, then read the inscription back

use bitcoin::consensus::encode::deserialize_hex;
use bitcoin::Transaction;
use darinals::broadcast::Submission;
use darinals::config::InscriptionConfig;
use darinals::errors::{AppError, BroadcastError, ValidationError};
use darinals::inscription::extract;
use darinals::minter::{MintContent, Minter};
use darinals::network::DashNetwork;
use darinals::rpc::MemoryNode;
use darinals::store::StateStore;
use darinals::wallet::WalletKey;
use std::sync::Arc;

use crate::common::{funded_node, memory_sequencer, sequencer};

fn minter(key: &WalletKey, node: &Arc<MemoryNode>) -> (Minter, Arc<darinals::store::MemoryStore<Vec<String>>>) {
    let (sequencer, pending) = memory_sequencer(node.clone());
    let minter = Minter::new(
        key.clone(),
        node.clone(),
        sequencer,
        InscriptionConfig::default(),
    );
    (minter, pending)
}

fn image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

#[tokio::test]
async fn test_mint_then_decode() -> anyhow::Result<()> {
    let (key, node) = funded_node(&[100_000]);
    let (minter, pending) = minter(&key, &node);
    let destination = WalletKey::generate(DashNetwork::Mainnet).address();
    let content = MintContent::new("image/png", image(1200));

    let minted = minter.mint(&destination, &content).await?;

    assert_eq!(node.accepted(), minted.raw_transactions());
    assert!(!pending.exists()?);
    assert_eq!(
        minted.inscription_id(),
        format!("{}:0", minted.reveal.transaction.txid)
    );
    assert_eq!(minted.commit.change, Some(100_000 - 15_000 - 2_000));

    let inscription = extract(node.as_ref(), &minted.reveal.transaction.txid).await?;
    assert_eq!(inscription.content_type, "image/png");
    assert_eq!(inscription.body, content.payload);

    let reveal: Transaction = deserialize_hex(&minted.reveal.transaction.hex)?;
    assert_eq!(reveal.output.len(), 1);
    assert_eq!(reveal.output[0].value.to_sat(), 14_000);
    assert_eq!(reveal.output[0].script_pubkey, destination.script_pubkey());
    Ok(())
}

#[tokio::test]
async fn test_largest_payload_mints() {
    let (key, node) = funded_node(&[20_000]);
    let (minter, _) = minter(&key, &node);
    let content = MintContent::new("image/png", image(1500));

    let minted = minter.mint(&key.address(), &content).await.unwrap();
    assert!(minted.reveal.script_sig_len <= 1650);

    let inscription = extract(node.as_ref(), &minted.reveal.transaction.txid)
        .await
        .unwrap();
    assert_eq!(inscription.body.len(), 1500);
}

#[tokio::test]
async fn test_failures_before_broadcast_send_nothing() {
    let (key, node) = funded_node(&[10_000]);
    let (minter, pending) = minter(&key, &node);
    let destination = key.address();

    let err = minter
        .mint(&destination, &MintContent::new("text/plain", b"gm".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientFunds {
            needed: 17_000,
            available: 10_000
        }
    ));

    let err = minter
        .mint(&destination, &MintContent::new("text/plain", image(1501)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::ContentTooLarge { .. })
    ));

    let err = minter
        .mint(&destination, &MintContent::new("text/plain", Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no data to mint");

    assert_eq!(node.submissions(), 0);
    assert!(!pending.exists().unwrap());
}

#[tokio::test]
async fn test_no_spendable_coins() {
    let (key, node) = funded_node(&[999, 500]);
    let (minter, _) = minter(&key, &node);

    let err = minter
        .mint(&key.address(), &MintContent::new("text/plain", b"gm".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoCoins { min_amount: 1000 }));
    assert_eq!(node.submissions(), 0);
}

#[tokio::test]
async fn test_rejected_reveal_is_queued_and_resumable() {
    let (key, node) = funded_node(&[50_000]);
    let (minter, pending) = minter(&key, &node);
    let content = MintContent::new("text/plain", b"queued".to_vec());

    node.accept_next();
    node.reject_next("bad-txns-in-belowout");
    let err = minter.mint(&key.address(), &content).await.unwrap_err();

    match &err {
        AppError::Broadcast(BroadcastError::Unrecoverable {
            index,
            total,
            reason,
            ..
        }) => {
            assert_eq!((*index, *total), (2, 2));
            assert!(reason.contains("bad-txns-in-belowout"));
        }
        other => panic!("unexpected error: {}", other),
    }

    let accepted = node.accepted();
    assert_eq!(accepted.len(), 1);
    let queued = pending.load().unwrap().unwrap();
    assert_eq!(queued.len(), 1);

    let commit: Transaction = deserialize_hex(&accepted[0]).unwrap();
    let reveal: Transaction = deserialize_hex(&queued[0]).unwrap();
    assert_eq!(reveal.input[0].previous_output.txid, commit.compute_txid());

    let resumed = sequencer(node.clone(), pending.clone())
        .resume_pending()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        resumed,
        vec![Submission::Accepted(reveal.compute_txid().to_string())]
    );
    assert!(!pending.exists().unwrap());

    let inscription = extract(node.as_ref(), &reveal.compute_txid()).await.unwrap();
    assert_eq!(inscription.body_text(), "queued");
}
