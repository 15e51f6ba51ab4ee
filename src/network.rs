//! Dash chain parameters, base58check addresses and WIF keys
//!
//! The `bitcoin` crate only knows Bitcoin's version bytes, so addresses and
//! WIF private keys are encoded here with the Dash prefixes on top of the
//! crate's `base58` and hash primitives.
//!
//! | Network | P2PKH | P2SH | WIF  |
//! |---------|-------|------|------|
//! | mainnet | 0x4c  | 0x10 | 0xcc |
//! | testnet | 0x8c  | 0x13 | 0xef |

use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{base58, NetworkKind, PrivateKey, PubkeyHash, PublicKey, ScriptBuf, ScriptHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Supported Dash networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashNetwork {
    #[default]
    Mainnet,
    Testnet,
}

/// Version bytes for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    pub pubkey_hash: u8,
    pub script_hash: u8,
    pub wif: u8,
}

impl DashNetwork {
    pub fn params(&self) -> ChainParams {
        match self {
            DashNetwork::Mainnet => ChainParams {
                pubkey_hash: 0x4c,
                script_hash: 0x10,
                wif: 0xcc,
            },
            DashNetwork::Testnet => ChainParams {
                pubkey_hash: 0x8c,
                script_hash: 0x13,
                wif: 0xef,
            },
        }
    }

    fn network_kind(&self) -> NetworkKind {
        match self {
            DashNetwork::Mainnet => NetworkKind::Main,
            DashNetwork::Testnet => NetworkKind::Test,
        }
    }
}

impl FromStr for DashNetwork {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "dash" => Ok(DashNetwork::Mainnet),
            "testnet" | "test" => Ok(DashNetwork::Testnet),
            other => Err(AppError::Config(format!(
                "unknown network '{}', expected mainnet|testnet",
                other
            ))),
        }
    }
}

impl fmt::Display for DashNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashNetwork::Mainnet => write!(f, "mainnet"),
            DashNetwork::Testnet => write!(f, "testnet"),
        }
    }
}

/// Payload of a base58check address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPayload {
    PubkeyHash(PubkeyHash),
    ScriptHash(ScriptHash),
}

/// A Dash address bound to its network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashAddress {
    pub network: DashNetwork,
    pub payload: AddressPayload,
}

impl DashAddress {
    pub fn p2pkh(public_key: &PublicKey, network: DashNetwork) -> Self {
        Self {
            network,
            payload: AddressPayload::PubkeyHash(PubkeyHash::hash(&public_key.to_bytes())),
        }
    }

    /// Pay-to-script-hash address: hash160 of the script under the P2SH version byte
    pub fn p2sh(script: &bitcoin::Script, network: DashNetwork) -> Self {
        Self {
            network,
            payload: AddressPayload::ScriptHash(ScriptHash::hash(script.as_bytes())),
        }
    }

    /// Parse and check the version byte against `network`
    pub fn parse(s: &str, network: DashNetwork) -> AppResult<Self> {
        let data = base58::decode_check(s)
            .map_err(|e| AppError::InvalidData(format!("invalid address {}: {}", s, e)))?;
        if data.len() != 21 {
            return Err(AppError::InvalidData(format!(
                "invalid address {}: expected 21 bytes, got {}",
                s,
                data.len()
            )));
        }

        let params = network.params();
        let hash: [u8; 20] = data[1..]
            .try_into()
            .map_err(|_| AppError::InvalidData(format!("invalid address {}", s)))?;
        let payload = match data[0] {
            v if v == params.pubkey_hash => {
                AddressPayload::PubkeyHash(PubkeyHash::from_byte_array(hash))
            }
            v if v == params.script_hash => {
                AddressPayload::ScriptHash(ScriptHash::from_byte_array(hash))
            }
            v => {
                return Err(AppError::InvalidData(format!(
                    "address {} has version byte 0x{:02x}, not valid on {}",
                    s, v, network
                )))
            }
        };

        Ok(Self { network, payload })
    }

    /// Locking script paying to this address
    pub fn script_pubkey(&self) -> ScriptBuf {
        match &self.payload {
            AddressPayload::PubkeyHash(hash) => ScriptBuf::new_p2pkh(hash),
            AddressPayload::ScriptHash(hash) => ScriptBuf::new_p2sh(hash),
        }
    }
}

impl fmt::Display for DashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.network.params();
        let mut data = Vec::with_capacity(21);
        match &self.payload {
            AddressPayload::PubkeyHash(hash) => {
                data.push(params.pubkey_hash);
                data.extend_from_slice(hash.as_byte_array());
            }
            AddressPayload::ScriptHash(hash) => {
                data.push(params.script_hash);
                data.extend_from_slice(hash.as_byte_array());
            }
        }
        write!(f, "{}", base58::encode_check(&data))
    }
}

/// Decode a WIF private key carrying the Dash version byte
pub fn decode_wif(wif: &str, network: DashNetwork) -> AppResult<PrivateKey> {
    let data = base58::decode_check(wif)
        .map_err(|e| AppError::Wallet(format!("invalid WIF private key: {}", e)))?;

    let compressed = match data.len() {
        33 => false,
        34 if data[33] == 0x01 => true,
        _ => {
            return Err(AppError::Wallet(format!(
                "invalid WIF private key length {}",
                data.len()
            )))
        }
    };

    if data[0] != network.params().wif {
        return Err(AppError::Wallet(format!(
            "WIF version byte 0x{:02x} is not valid on {}",
            data[0], network
        )));
    }

    let inner = SecretKey::from_slice(&data[1..33])
        .map_err(|e| AppError::Wallet(format!("invalid secret key: {}", e)))?;

    Ok(PrivateKey {
        compressed,
        network: network.network_kind(),
        inner,
    })
}

/// Encode a private key as WIF with the Dash version byte
pub fn encode_wif(key: &PrivateKey, network: DashNetwork) -> String {
    let mut data = Vec::with_capacity(34);
    data.push(network.params().wif);
    data.extend_from_slice(&key.inner.secret_bytes());
    if key.compressed {
        data.push(0x01);
    }
    base58::encode_check(&data)
}

/// Public key for a private key
pub fn public_key(key: &PrivateKey) -> PublicKey {
    let secp = Secp256k1::signing_only();
    key.public_key(&secp)
}
