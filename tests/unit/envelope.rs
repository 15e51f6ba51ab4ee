//! Envelope layout shared by the reveal builder and the extractor

use darinals::errors::DecodeError;
use darinals::inscription::grammar::{
    chunk_content, chunk_count, compile, decompile, envelope_tokens, parse_envelope,
    EnvelopeParts, Token, HEADER_LEN, TRAILER_LEN,
};
use darinals::inscription::{extract_from_script_sig, RedeemScript};
use darinals::network::DashNetwork;
use darinals::wallet::WalletKey;

fn envelope(content_type: &[u8], payload: &[u8]) -> Vec<u8> {
    compile(&envelope_tokens(&EnvelopeParts {
        content_type,
        chunks: chunk_content(payload),
        signature: &[0x30; 72],
        redeem_script: &[0x51; 45],
    }))
    .unwrap()
    .to_bytes()
}

#[test]
fn test_layout_constants() {
    assert_eq!(HEADER_LEN, 4);
    assert_eq!(TRAILER_LEN, 2);
    assert_eq!(chunk_count(0), 0);
    assert_eq!(chunk_count(500), 1);
    assert_eq!(chunk_count(501), 2);
    assert_eq!(chunk_count(1500), 3);
}

#[test]
fn test_script_starts_with_marker_and_tags() {
    let script = envelope(b"text/plain", b"hello world");
    // push(3) "ord", OP_1, push(10) "text/plain", OP_0
    assert_eq!(&script[..5], &[0x03, b'o', b'r', b'd', 0x51]);
    assert_eq!(script[5], 10);
    assert_eq!(&script[6..16], b"text/plain");
    assert_eq!(script[16], 0x00);
}

#[test]
fn test_extracts_script_with_opcode_tags() {
    // "ord", OP_1, "image/svg+xml", OP_0, one chunk, signature, redeem script
    let mut script = vec![0x03, b'o', b'r', b'd', 0x51, 0x0d];
    script.extend_from_slice(b"image/svg+xml");
    script.extend_from_slice(&[0x00, 0x0b]);
    script.extend_from_slice(b"<svg></svg>");
    script.push(0x48);
    script.extend_from_slice(&[0x30; 72]);
    script.push(0x2d);
    script.extend_from_slice(&[0x51; 45]);

    let decoded = extract_from_script_sig(&script).unwrap();
    assert_eq!(decoded.content_type, "image/svg+xml");
    assert_eq!(decoded.body, b"<svg></svg>");
    assert_eq!(envelope(b"image/svg+xml", b"<svg></svg>"), script);
}

#[test]
fn test_single_byte_payloads_survive_minimal_pushes() {
    for byte in [0x00u8, 0x01, 0x05, 0x10, 0x11, 0x81, 0xff] {
        let decoded = extract_from_script_sig(&envelope(b"application/octet-stream", &[byte]))
            .unwrap();
        assert_eq!(decoded.body, vec![byte], "byte {:#04x}", byte);
    }
}

#[test]
fn test_chunk_boundaries_are_invisible_after_decode() {
    let payload: Vec<u8> = (0..1250u32).map(|i| (i % 251) as u8).collect();
    let tokens = decompile(bitcoin::Script::from_bytes(&envelope(b"image/png", &payload))).unwrap();

    assert_eq!(tokens.len(), HEADER_LEN + 3 + TRAILER_LEN);
    let parsed = parse_envelope(&tokens).unwrap();
    assert_eq!(parsed.content_type, b"image/png");
    assert_eq!(parsed.body, payload);
}

#[test]
fn test_non_data_opcode_in_body_is_invalid() {
    let mut tokens = envelope_tokens(&EnvelopeParts {
        content_type: b"text/plain",
        chunks: vec![&b"ab"[..]],
        signature: &[0x30; 72],
        redeem_script: &[0x51; 45],
    });
    tokens.insert(
        HEADER_LEN,
        Token::Op(bitcoin::opcodes::all::OP_CHECKSIG),
    );

    assert!(matches!(
        parse_envelope(&tokens),
        Err(DecodeError::InvalidFormat(_))
    ));
}

#[test]
fn test_redeem_script_drops_every_envelope_push() {
    let key = WalletKey::generate(DashNetwork::Mainnet);
    for chunks in 1..=3usize {
        let redeem = RedeemScript::new(key.public_key(), chunks).unwrap();
        assert_eq!(redeem.drop_count, chunks + HEADER_LEN);
        // 33-byte key push, OP_CHECKSIGVERIFY, drops, OP_1
        assert_eq!(redeem.as_bytes().len(), 34 + 1 + chunks + HEADER_LEN + 1);
        assert_eq!(redeem.as_bytes().last(), Some(&0x51));
    }
}
