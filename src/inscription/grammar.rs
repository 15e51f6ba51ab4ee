//! Inscription script grammar
//!
//! Single source of truth for the on-chain byte layout used by both the reveal
//! builder (encode direction) and the extractor (decode direction).
//!
//! ## Unlocking script (reveal input)
//!
//! ```text
//! <"ord"> OP_1 <content-type> OP_0 <chunk_0> ... <chunk_n-1> <signature+hashtype> <redeem-script>
//! ```
//!
//! ## Redeem script
//!
//! ```text
//! <pubkey> OP_CHECKSIGVERIFY OP_DROP x (n + 4) OP_1
//! ```
//!
//! The `+ 4` is the number of envelope fields in front of the body (marker,
//! content-type tag, content type, body tag), derived from [`ENVELOPE`].
//!
//! Pushes are always minimal: a single byte `1..=16` compiles to
//! `OP_1..OP_16`, `0x81` to `OP_1NEGATE` and the empty push to `OP_0`.
//! [`Token::as_data`] maps those opcodes back, so payload bytes survive the
//! round trip whatever their value.

use bitcoin::opcodes::all::{OP_CHECKSIGVERIFY, OP_DROP, OP_PUSHNUM_1, OP_PUSHNUM_16, OP_PUSHNUM_NEG1};
use bitcoin::opcodes::Opcode;
use bitcoin::script::{Builder, Instruction, PushBytesBuf};
use bitcoin::{Script, ScriptBuf};

use crate::errors::{AppError, AppResult, DecodeError};

/// Maximum payload size accepted for minting
pub const MAX_CONTENT_SIZE: usize = 1500;

/// Payload slice size for body pushes
pub const CHUNK_SIZE: usize = 500;

/// Largest single element the script interpreter accepts
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Network limit for a complete unlocking script
pub const SCRIPT_SIG_MAX_SIZE: usize = 1650;

/// Smallest output amount considered spendable
pub const DUST_THRESHOLD: u64 = 546;

/// Envelope marker
pub const PROTOCOL_ID: [u8; 3] = *b"ord";

/// Tag opcode in front of the content type (`OP_1`)
pub const CONTENT_TYPE_TAG: Token = Token::Small(1);

/// Tag opcode in front of the body (`OP_0`)
pub const BODY_TAG: Token = Token::Small(0);

/// One decompiled script element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Data push of two or more bytes, or a non-minimal push
    Data(Vec<u8>),
    /// `OP_0` or `OP_1..OP_16`
    Small(u8),
    /// Any other opcode
    Op(Opcode),
}

impl Token {
    /// Data carried by the token, mapping minimal-push opcodes back to bytes
    pub fn as_data(&self) -> Option<Vec<u8>> {
        match self {
            Token::Data(bytes) => Some(bytes.clone()),
            Token::Small(0) => Some(Vec::new()),
            Token::Small(n) => Some(vec![*n]),
            Token::Op(op) if *op == OP_PUSHNUM_NEG1 => Some(vec![0x81]),
            Token::Op(_) => None,
        }
    }

    fn data(bytes: &[u8]) -> Self {
        match bytes {
            [] => Token::Small(0),
            [n @ 1..=16] => Token::Small(*n),
            _ => Token::Data(bytes.to_vec()),
        }
    }
}

/// Fields of the reveal unlocking script, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Marker,
    ContentTypeTag,
    ContentType,
    BodyTag,
    /// Zero or more chunk pushes
    Body,
    Signature,
    RedeemScript,
}

impl Field {
    /// Exact token of the constant fields
    ///
    /// Tags are opcodes, not data pushes: the body tag is the single byte
    /// `0x00`, never the push `01 00`.
    pub fn tag(&self) -> Option<Token> {
        match self {
            Field::Marker => Some(Token::Data(PROTOCOL_ID.to_vec())),
            Field::ContentTypeTag => Some(CONTENT_TYPE_TAG),
            Field::BodyTag => Some(BODY_TAG),
            _ => None,
        }
    }
}

/// Reveal unlocking script layout
pub const ENVELOPE: [Field; 7] = [
    Field::Marker,
    Field::ContentTypeTag,
    Field::ContentType,
    Field::BodyTag,
    Field::Body,
    Field::Signature,
    Field::RedeemScript,
];

const fn body_position() -> usize {
    let mut i = 0;
    while i < ENVELOPE.len() {
        if matches!(ENVELOPE[i], Field::Body) {
            return i;
        }
        i += 1;
    }
    panic!("envelope layout has no body field");
}

/// Number of fields pushed before the body
pub const HEADER_LEN: usize = body_position();

/// Number of fields pushed after the body
pub const TRAILER_LEN: usize = ENVELOPE.len() - HEADER_LEN - 1;

/// Number of body chunks for a payload of `len` bytes
pub fn chunk_count(len: usize) -> usize {
    len.div_ceil(CHUNK_SIZE)
}

/// Slice a payload into body chunks
pub fn chunk_content(payload: &[u8]) -> Vec<&[u8]> {
    payload.chunks(CHUNK_SIZE).collect()
}

/// `OP_DROP` count in the redeem script for `chunks` body pushes
pub fn drop_count(chunks: usize) -> usize {
    chunks + HEADER_LEN
}

/// Values for every variable field of an envelope
#[derive(Debug, Clone)]
pub struct EnvelopeParts<'a> {
    pub content_type: &'a [u8],
    pub chunks: Vec<&'a [u8]>,
    pub signature: &'a [u8],
    pub redeem_script: &'a [u8],
}

/// Token sequence for the reveal unlocking script
pub fn envelope_tokens(parts: &EnvelopeParts<'_>) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(ENVELOPE.len() + parts.chunks.len());
    for field in ENVELOPE {
        match field {
            Field::Marker | Field::ContentTypeTag | Field::BodyTag => {
                if let Some(tag) = field.tag() {
                    tokens.push(tag);
                }
            }
            Field::ContentType => tokens.push(Token::data(parts.content_type)),
            Field::Body => tokens.extend(parts.chunks.iter().map(|chunk| Token::data(chunk))),
            Field::Signature => tokens.push(Token::data(parts.signature)),
            Field::RedeemScript => tokens.push(Token::data(parts.redeem_script)),
        }
    }
    tokens
}

/// Token sequence for the redeem script locking the commit output
pub fn redeem_script_tokens(public_key: &[u8], chunks: usize) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(drop_count(chunks) + 3);
    tokens.push(Token::data(public_key));
    tokens.push(Token::Op(OP_CHECKSIGVERIFY));
    tokens.extend(std::iter::repeat(Token::Op(OP_DROP)).take(drop_count(chunks)));
    tokens.push(Token::Small(1));
    tokens
}

/// Compile tokens into script bytes
pub fn compile(tokens: &[Token]) -> AppResult<ScriptBuf> {
    let mut builder = Builder::new();
    for token in tokens {
        builder = match token {
            Token::Small(n) => builder.push_int(i64::from(*n)),
            Token::Op(op) => builder.push_opcode(*op),
            Token::Data(bytes) => match bytes.as_slice() {
                [0x81] => builder.push_opcode(OP_PUSHNUM_NEG1),
                [n @ 1..=16] => builder.push_int(i64::from(*n)),
                [] => builder.push_int(0),
                _ => {
                    let push = PushBytesBuf::try_from(bytes.clone()).map_err(|_| {
                        AppError::Transaction(format!(
                            "script element of {} bytes cannot be pushed",
                            bytes.len()
                        ))
                    })?;
                    builder.push_slice(push)
                }
            },
        };
    }
    Ok(builder.into_script())
}

/// Decompile script bytes into tokens
pub fn decompile(script: &Script) -> Result<Vec<Token>, DecodeError> {
    script
        .instructions()
        .map(|instruction| {
            let instruction =
                instruction.map_err(|e| DecodeError::MalformedScript(e.to_string()))?;
            Ok(match instruction {
                Instruction::PushBytes(push) if push.is_empty() => Token::Small(0),
                Instruction::PushBytes(push) => Token::Data(push.as_bytes().to_vec()),
                Instruction::Op(op) => match small_int(op) {
                    Some(n) => Token::Small(n),
                    None => Token::Op(op),
                },
            })
        })
        .collect()
}

fn small_int(op: Opcode) -> Option<u8> {
    let code = op.to_u8();
    if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&code) {
        Some(code - OP_PUSHNUM_1.to_u8() + 1)
    } else {
        None
    }
}

/// Content type and body recovered from an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnvelope {
    pub content_type: Vec<u8>,
    pub body: Vec<u8>,
}

/// Walk the envelope layout over decompiled tokens
///
/// Everything between the header and the last [`TRAILER_LEN`] tokens is body.
pub fn parse_envelope(tokens: &[Token]) -> Result<ParsedEnvelope, DecodeError> {
    let marker = tokens
        .iter()
        .position(|token| token.as_data().as_deref() == Some(&PROTOCOL_ID[..]))
        .ok_or(DecodeError::NotAnInscription)?;
    let envelope = &tokens[marker..];

    let mut content_type = None;
    for (index, field) in ENVELOPE[..HEADER_LEN].iter().enumerate() {
        let token = envelope.get(index).ok_or_else(|| {
            DecodeError::InvalidFormat(format!("envelope truncated before {:?}", field))
        })?;
        match field.tag() {
            Some(expected) => {
                if *token != expected {
                    return Err(DecodeError::InvalidFormat(format!(
                        "expected {:?}, found {:?}",
                        field, token
                    )));
                }
            }
            None => {
                let value = token.as_data().ok_or_else(|| {
                    DecodeError::InvalidFormat(format!("{:?} is not a data push", field))
                })?;
                if *field == Field::ContentType {
                    content_type = Some(value);
                }
            }
        }
    }

    let body_end = envelope.len().saturating_sub(TRAILER_LEN).max(HEADER_LEN);
    let mut body = Vec::new();
    for token in &envelope[HEADER_LEN..body_end] {
        let chunk = token.as_data().ok_or_else(|| {
            DecodeError::InvalidFormat(format!("unexpected {:?} in body", token))
        })?;
        body.extend_from_slice(&chunk);
    }

    let content_type = content_type.ok_or_else(|| {
        DecodeError::InvalidFormat("envelope header has no content type".to_string())
    })?;
    Ok(ParsedEnvelope { content_type, body })
}
