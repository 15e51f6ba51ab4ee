//! Inscription decoding
//!
//! Inverse of the reveal builder: decompile the first input's unlocking script
//! and read the envelope back out of it.

use bitcoin::{Script, Txid};
use tracing::debug;

use super::grammar::{decompile, parse_envelope};
use crate::errors::{AppResult, DecodeError};
use crate::rpc::TransactionLookup;

/// Input carrying the envelope in every reveal
const REVEAL_INPUT_INDEX: usize = 0;

/// Decoded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inscription {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Inscription {
    /// Body as text, replacing invalid UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Decode an inscription from raw unlocking script bytes
pub fn extract_from_script_sig(script_sig: &[u8]) -> Result<Inscription, DecodeError> {
    let tokens = decompile(Script::from_bytes(script_sig))?;
    let parsed = parse_envelope(&tokens)?;
    Ok(Inscription {
        content_type: String::from_utf8_lossy(&parsed.content_type).into_owned(),
        body: parsed.body,
    })
}

/// Fetch `txid` and decode the inscription revealed by its first input
pub async fn extract(lookup: &dyn TransactionLookup, txid: &Txid) -> AppResult<Inscription> {
    let script_sig = lookup.input_script(txid, REVEAL_INPUT_INDEX).await?;
    let inscription = extract_from_script_sig(&script_sig)?;
    debug!(
        "Decoded {} byte {} inscription from {}",
        inscription.body.len(),
        inscription.content_type,
        txid
    );
    Ok(inscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inscription::grammar::{chunk_content, compile, envelope_tokens, EnvelopeParts};
    use bitcoin::opcodes::all::OP_CHECKSIG;
    use bitcoin::script::{Builder, PushBytesBuf};

    fn push(bytes: &[u8]) -> PushBytesBuf {
        PushBytesBuf::try_from(bytes.to_vec()).unwrap()
    }

    fn script_sig(content_type: &[u8], payload: &[u8]) -> Vec<u8> {
        compile(&envelope_tokens(&EnvelopeParts {
            content_type,
            chunks: chunk_content(payload),
            signature: &[0x30; 71],
            redeem_script: &[0x21; 60],
        }))
        .unwrap()
        .to_bytes()
    }

    #[test]
    fn test_round_trip_boundaries() {
        for len in [1usize, 499, 500, 501, 999, 1000, 1001, 1500] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let decoded = extract_from_script_sig(&script_sig(b"image/png", &payload)).unwrap();
            assert_eq!(decoded.content_type, "image/png", "len {}", len);
            assert_eq!(decoded.body, payload, "len {}", len);
        }
    }

    #[test]
    fn test_single_chunk_minimum() {
        let decoded = extract_from_script_sig(&script_sig(b"text/plain", b"a")).unwrap();
        assert_eq!(decoded.body, b"a");
        assert_eq!(decoded.body_text(), "a");
    }

    #[test]
    fn test_small_integer_chunk_survives() {
        let decoded = extract_from_script_sig(&script_sig(b"text/plain", &[0x05])).unwrap();
        assert_eq!(decoded.body, vec![0x05]);
    }

    #[test]
    fn test_missing_marker() {
        let script = Builder::new()
            .push_slice(push(b"abc"))
            .push_opcode(OP_CHECKSIG)
            .into_script();
        assert_eq!(
            extract_from_script_sig(script.as_bytes()),
            Err(DecodeError::NotAnInscription)
        );
    }

    #[test]
    fn test_plain_p2pkh_spend_is_not_an_inscription() {
        let script = Builder::new()
            .push_slice(push(&[0x30; 71]))
            .push_slice(push(&[0x02; 33]))
            .into_script();
        assert_eq!(
            extract_from_script_sig(script.as_bytes()),
            Err(DecodeError::NotAnInscription)
        );
    }

    #[test]
    fn test_wrong_content_type_tag() {
        let script = Builder::new()
            .push_slice(push(b"ord"))
            .push_int(2)
            .push_slice(push(b"text/plain"))
            .into_script();
        assert!(matches!(
            extract_from_script_sig(script.as_bytes()),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_wrong_body_tag() {
        let script = Builder::new()
            .push_slice(push(b"ord"))
            .push_int(1)
            .push_slice(push(b"text/plain"))
            .push_int(1)
            .push_slice(push(b"body"))
            .into_script();
        assert!(matches!(
            extract_from_script_sig(script.as_bytes()),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_truncated_push() {
        assert!(matches!(
            extract_from_script_sig(&[0x4c, 0x10, 0x01]),
            Err(DecodeError::MalformedScript(_))
        ));
    }

    #[test]
    fn test_lossy_content_type() {
        let decoded = extract_from_script_sig(&script_sig(&[0xff, 0xfe], b"x")).unwrap();
        assert_eq!(decoded.content_type, "\u{fffd}\u{fffd}");
    }
}
