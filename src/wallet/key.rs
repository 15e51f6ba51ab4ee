//! Wallet signing key
//!
//! Signatures use the legacy (pre-segwit) signature hash with `SIGHASH_ALL`,
//! DER-encoded with the hash-type byte appended.

use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::secp256k1::{rand, All, Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{ecdsa, NetworkKind, PrivateKey, PublicKey, Script, ScriptBuf, Transaction};

use crate::errors::{AppError, AppResult};
use crate::network::{decode_wif, encode_wif, DashAddress, DashNetwork};

/// Single-signer key used for funding inputs and the reveal input
#[derive(Clone)]
pub struct WalletKey {
    private_key: PrivateKey,
    public_key: PublicKey,
    network: DashNetwork,
    secp: Secp256k1<All>,
}

impl WalletKey {
    pub fn from_wif(wif: &str, network: DashNetwork) -> AppResult<Self> {
        let private_key = decode_wif(wif, network)?;
        if !private_key.compressed {
            return Err(AppError::Wallet(
                "uncompressed keys are not supported".to_string(),
            ));
        }
        Ok(Self::from_private_key(private_key, network))
    }

    /// Fresh random compressed key
    pub fn generate(network: DashNetwork) -> Self {
        let secp = Secp256k1::new();
        let (secret, _) = secp.generate_keypair(&mut rand::thread_rng());
        let kind = match network {
            DashNetwork::Mainnet => NetworkKind::Main,
            DashNetwork::Testnet => NetworkKind::Test,
        };
        Self::from_private_key(PrivateKey::new(secret, kind), network)
    }

    fn from_private_key(private_key: PrivateKey, network: DashNetwork) -> Self {
        let secp = Secp256k1::new();
        let public_key = private_key.public_key(&secp);
        Self {
            private_key,
            public_key,
            network,
            secp,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn network(&self) -> DashNetwork {
        self.network
    }

    pub fn to_wif(&self) -> String {
        encode_wif(&self.private_key, self.network)
    }

    /// P2PKH address of this key
    pub fn address(&self) -> DashAddress {
        DashAddress::p2pkh(&self.public_key, self.network)
    }

    /// Sign input `input_index` of `tx` over `script_code`
    ///
    /// # Returns
    /// DER signature followed by the `SIGHASH_ALL` byte
    pub fn sign_input(
        &self,
        tx: &Transaction,
        input_index: usize,
        script_code: &Script,
    ) -> AppResult<Vec<u8>> {
        let sighash = SighashCache::new(tx)
            .legacy_signature_hash(input_index, script_code, EcdsaSighashType::All.to_u32())
            .map_err(|e| {
                AppError::Transaction(format!("sighash for input {}: {}", input_index, e))
            })?;
        let message = Message::from_digest(sighash.to_byte_array());
        let signature = self.secp.sign_ecdsa(&message, &self.private_key.inner);
        Ok(ecdsa::Signature::sighash_all(signature).to_vec())
    }

    /// `<signature> <pubkey>` unlocking script for a P2PKH input
    pub fn p2pkh_script_sig(&self, signature: Vec<u8>) -> AppResult<ScriptBuf> {
        let signature = PushBytesBuf::try_from(signature)
            .map_err(|_| AppError::Transaction("signature too large".to_string()))?;
        Ok(Builder::new()
            .push_slice(signature)
            .push_key(&self.public_key)
            .into_script())
    }
}

#[cfg(test)]
impl WalletKey {
    /// Deterministic mainnet key whose secret is `seed` repeated
    pub(crate) fn for_tests(seed: u8) -> Self {
        let secret = bitcoin::secp256k1::SecretKey::from_slice(&[seed; 32])
            .expect("non-zero seed is a valid secret");
        Self::from_private_key(
            PrivateKey::new(secret, NetworkKind::Main),
            DashNetwork::Mainnet,
        )
    }
}

impl std::fmt::Debug for WalletKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKey")
            .field("address", &self.address().to_string())
            .finish_non_exhaustive()
    }
}
