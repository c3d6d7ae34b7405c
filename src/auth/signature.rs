//! HMAC-SHA256 request signatures.
//!
//! The canonical signing string is the decimal timestamp exactly as sent in
//! `X-Ts`, immediately followed by the raw body bytes. No separator, no
//! normalisation of either part.

use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Ts";
pub const SIGNATURE_HEADER: &str = "X-Sign";

/// Length of a hex-encoded HMAC-SHA256 tag
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Bytes covered by the signature: `timestamp ++ body`
pub fn signing_input(timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(timestamp.len() + body.len());
    input.extend_from_slice(timestamp.as_bytes());
    input.extend_from_slice(body);
    input
}

/// Lowercase hex HMAC-SHA256 of the canonical signing string
pub fn sign(secret: &[u8], timestamp: &str, body: &[u8]) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(&signing_input(timestamp, body));
    hex::encode(mac.finalize().into_bytes())
}

/// Builds the MAC from a block-sized key. Keys longer than the SHA-256 block
/// are hashed first and shorter ones are zero-padded, which is the RFC 2104
/// key schedule, so the fixed-size constructor covers every secret length.
fn keyed_mac(secret: &[u8]) -> HmacSha256 {
    let mut key = Key::<HmacSha256>::default();
    if secret.len() > key.len() {
        let digest = Sha256::digest(secret);
        key[..digest.len()].copy_from_slice(&digest);
    } else {
        key[..secret.len()].copy_from_slice(secret);
    }
    <HmacSha256 as KeyInit>::new(&key)
}

/// Compares two byte strings without leaking the position of the first
/// difference. Unequal lengths return early; length is not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Header pair a client attaches to a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub timestamp: String,
    pub signature: String,
}

impl SignedHeaders {
    pub fn new(secret: &[u8], timestamp: i64, body: &[u8]) -> Self {
        let timestamp = timestamp.to_string();
        let signature = sign(secret, &timestamp, body);
        Self { timestamp, signature }
    }
}
