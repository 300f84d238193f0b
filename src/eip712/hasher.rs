//! EIP-712 Signable Payload
//!
//! Assembles `0x19 0x01 ‖ domainSeparator ‖ hashStruct(message)` and its
//! keccak256 digest. When the primary type is `EIP712Domain` the message
//! hash is omitted and only the domain is signed.

use super::encoder::hash_struct_with_settings;
use super::types::*;
use crate::utils::config::EncodingSettings;
use crate::utils::crypto::{keccak256, to_hex_prefixed};

const LOG_MODULE: &str = "eip712::hasher";

/// EIP-191 version byte prefix for structured data
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

/// The ordered parts a signer hashes together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignablePayload {
    /// hashStruct(domain)
    pub domain_separator: [u8; 32],
    /// hashStruct(message); absent for domain-only documents
    pub struct_hash: Option<[u8; 32]>,
}

impl SignablePayload {
    /// Payload parts in signing order: prefix, domain separator, then the
    /// message hash when present
    pub fn parts(&self) -> Vec<Vec<u8>> {
        let mut parts = vec![EIP712_PREFIX.to_vec(), self.domain_separator.to_vec()];
        if let Some(struct_hash) = self.struct_hash {
            parts.push(struct_hash.to_vec());
        }
        parts
    }

    /// All parts concatenated
    pub fn concat(&self) -> Vec<u8> {
        self.parts().concat()
    }

    /// keccak256 of the concatenated parts
    pub fn digest(&self) -> [u8; 32] {
        keccak256(&self.concat())
    }
}

/// Build the signable payload for a typed-data document
pub fn encode_typed_data(typed_data: &TypedData) -> Result<SignablePayload, Eip712Error> {
    encode_typed_data_with_settings(typed_data, &EncodingSettings::default())
}

/// Build the signable payload with explicit encoder settings
pub fn encode_typed_data_with_settings(
    typed_data: &TypedData,
    settings: &EncodingSettings,
) -> Result<SignablePayload, Eip712Error> {
    let payload = build_payload(typed_data, settings).map_err(|e| as_document_error(e, typed_data))?;

    crate::log_debug!(
        LOG_MODULE,
        "encoded typed data",
        primary_type = typed_data.primary_type,
        domain_separator = to_hex_prefixed(&payload.domain_separator),
        parts = payload.parts().len(),
    );
    Ok(payload)
}

/// Hash a typed-data document to the 32-byte digest that gets signed
pub fn hash_typed_data(typed_data: &TypedData) -> Result<[u8; 32], Eip712Error> {
    hash_typed_data_with_settings(typed_data, &EncodingSettings::default())
}

/// Hash a typed-data document with explicit encoder settings
pub fn hash_typed_data_with_settings(
    typed_data: &TypedData,
    settings: &EncodingSettings,
) -> Result<[u8; 32], Eip712Error> {
    Ok(encode_typed_data_with_settings(typed_data, settings)?.digest())
}

/// Compute the domain separator alone
pub fn hash_domain(typed_data: &TypedData) -> Result<[u8; 32], Eip712Error> {
    if typed_data.domain.as_struct().is_none() {
        return Err(document_error("domain must be an object", typed_data));
    }
    hash_struct_with_settings(DOMAIN_TYPE, &typed_data.domain, &typed_data.types, &EncodingSettings::default())
        .map_err(|e| as_document_error(e, typed_data))
}

fn build_payload(typed_data: &TypedData, settings: &EncodingSettings) -> Result<SignablePayload, Eip712Error> {
    if typed_data.domain.as_struct().is_none() {
        return Err(document_error("domain must be an object", typed_data));
    }
    let domain_separator =
        hash_struct_with_settings(DOMAIN_TYPE, &typed_data.domain, &typed_data.types, settings)?;

    if typed_data.is_domain_only() {
        return Ok(SignablePayload {
            domain_separator,
            struct_hash: None,
        });
    }

    let message = typed_data
        .message
        .as_ref()
        .filter(|m| !m.is_null())
        .ok_or_else(|| document_error("message is required unless primaryType is EIP712Domain", typed_data))?;

    let struct_hash =
        hash_struct_with_settings(&typed_data.primary_type, message, &typed_data.types, settings)?;

    Ok(SignablePayload {
        domain_separator,
        struct_hash: Some(struct_hash),
    })
}

/// Lookup failures surface as a malformed document; every other error
/// passes through unchanged
fn as_document_error(error: Eip712Error, typed_data: &TypedData) -> Eip712Error {
    if error.is_lookup_error() {
        document_error(&error.to_string(), typed_data)
    } else {
        error
    }
}

fn document_error(reason: &str, typed_data: &TypedData) -> Eip712Error {
    Eip712Error::InvalidDocument {
        reason: reason.to_string(),
        document: serde_json::to_string(typed_data).unwrap_or_else(|_| format!("{:?}", typed_data)),
    }
}
