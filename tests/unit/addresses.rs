//! Address and key encoding with Dash version bytes

use darinals::errors::AppError;
use darinals::inscription::RedeemScript;
use darinals::network::{AddressPayload, DashAddress, DashNetwork};
use darinals::wallet::WalletKey;

#[test]
fn test_mainnet_and_testnet_prefixes() {
    let mainnet = WalletKey::generate(DashNetwork::Mainnet);
    assert!(mainnet.address().to_string().starts_with('X'));

    let testnet = WalletKey::generate(DashNetwork::Testnet);
    assert!(testnet.address().to_string().starts_with('y'));

    let redeem = RedeemScript::new(mainnet.public_key(), 1).unwrap();
    assert!(redeem
        .p2sh_address(DashNetwork::Mainnet)
        .to_string()
        .starts_with('7'));
}

#[test]
fn test_address_parse_round_trip() {
    let key = WalletKey::generate(DashNetwork::Mainnet);
    let address = key.address();
    let parsed = DashAddress::parse(&address.to_string(), DashNetwork::Mainnet).unwrap();

    assert_eq!(parsed, address);
    assert!(matches!(parsed.payload, AddressPayload::PubkeyHash(_)));
    assert_eq!(parsed.script_pubkey(), address.script_pubkey());
}

#[test]
fn test_address_from_other_network_rejected() {
    let key = WalletKey::generate(DashNetwork::Testnet);
    let err = DashAddress::parse(&key.address().to_string(), DashNetwork::Mainnet).unwrap_err();
    assert!(matches!(err, AppError::InvalidData(_)));

    assert!(DashAddress::parse("not-an-address", DashNetwork::Mainnet).is_err());
}

#[test]
fn test_wif_round_trip_keeps_address() {
    let key = WalletKey::generate(DashNetwork::Mainnet);
    let restored = WalletKey::from_wif(&key.to_wif(), DashNetwork::Mainnet).unwrap();
    assert_eq!(restored.address(), key.address());
    assert_eq!(restored.public_key(), key.public_key());

    assert!(matches!(
        WalletKey::from_wif(&key.to_wif(), DashNetwork::Testnet),
        Err(AppError::Wallet(_))
    ));
}
