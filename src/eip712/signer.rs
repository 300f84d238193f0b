//! EIP-712 Signing
//!
//! Thin pass-through to secp256k1 ECDSA: the digest of a signable payload
//! is signed with RFC 6979 deterministic nonces and packed as `r ‖ s ‖ v`
//! with `v = recovery_id + 27`.

use super::hasher::{hash_typed_data_with_settings, SignablePayload};
use super::types::*;
use crate::utils::config::EncodingSettings;
use crate::utils::crypto::{decode_hex, to_hex_prefixed};
use secp256k1::{Message, Secp256k1, SecretKey};
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

const LOG_MODULE: &str = "eip712::signer";

/// A 32-byte secp256k1 private key, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Accept exactly 32 raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Eip712Error> {
        let key: [u8; 32] = bytes.try_into().map_err(|_| {
            Eip712Error::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(key))
    }

    /// Accept 64 hex characters with an optional `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, Eip712Error> {
        let mut bytes = decode_hex(s.trim())
            .map_err(|e| Eip712Error::InvalidPrivateKey(format!("invalid hex: {}", e)))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PrivateKey {
    type Err = Eip712Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = Eip712Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// What gets signed: a full payload (hashed first) or a precomputed digest
#[derive(Debug, Clone, Copy)]
pub enum SigningInput<'a> {
    Payload(&'a SignablePayload),
    Digest([u8; 32]),
}

impl SigningInput<'_> {
    pub fn digest(&self) -> [u8; 32] {
        match self {
            SigningInput::Payload(payload) => payload.digest(),
            SigningInput::Digest(digest) => *digest,
        }
    }
}

impl<'a> From<&'a SignablePayload> for SigningInput<'a> {
    fn from(payload: &'a SignablePayload) -> Self {
        SigningInput::Payload(payload)
    }
}

impl From<[u8; 32]> for SigningInput<'_> {
    fn from(digest: [u8; 32]) -> Self {
        SigningInput::Digest(digest)
    }
}

/// Sign EIP-712 typed data
pub fn sign_typed_data(
    typed_data: &TypedData,
    private_key: &PrivateKey,
) -> Result<Eip712Signature, Eip712Error> {
    sign_typed_data_with_settings(typed_data, private_key, &EncodingSettings::default())
}

/// Sign EIP-712 typed data with explicit encoder settings
pub fn sign_typed_data_with_settings(
    typed_data: &TypedData,
    private_key: &PrivateKey,
    settings: &EncodingSettings,
) -> Result<Eip712Signature, Eip712Error> {
    let hash = hash_typed_data_with_settings(typed_data, settings)?;
    sign_hash(&hash, private_key)
}

/// Sign a payload or a precomputed digest
pub fn sign_payload<'a>(
    input: impl Into<SigningInput<'a>>,
    private_key: &PrivateKey,
) -> Result<Eip712Signature, Eip712Error> {
    sign_hash(&input.into().digest(), private_key)
}

/// Sign a pre-computed hash
pub fn sign_hash(hash: &[u8; 32], private_key: &PrivateKey) -> Result<Eip712Signature, Eip712Error> {
    let secp = Secp256k1::signing_only();

    let secret_key = SecretKey::from_slice(private_key.as_bytes())
        .map_err(|e| Eip712Error::InvalidPrivateKey(e.to_string()))?;
    let message = Message::from_digest(*hash);

    let (recovery_id, signature) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[0..32]);
    s.copy_from_slice(&signature[32..64]);

    let v = u8::try_from(recovery_id.to_i32())
        .map_err(|e| Eip712Error::SigningError(e.to_string()))?
        + 27;

    crate::log_debug!(LOG_MODULE, "signed digest", digest = to_hex_prefixed(hash), v = v);
    Ok(Eip712Signature::new(r, s, v))
}
