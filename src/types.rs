//! Shared response types
//!
//! Data structures that cross the FFI and CLI boundaries are defined here
//! for consistent serialization. Byte strings are rendered as `0x` hex.

use crate::eip712::{Eip712Signature, SignablePayload};
use crate::utils::crypto::to_hex_prefixed;
use serde::{Deserialize, Serialize};

// =============================================================================
// EIP-712 Types
// =============================================================================

/// Signable payload parts, in signing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeResponse {
    /// `0x1901`, domain separator and, unless domain-only, the message hash
    pub parts: Vec<String>,
    /// keccak256 of the concatenated parts
    pub digest: String,
}

impl From<&SignablePayload> for EncodeResponse {
    fn from(payload: &SignablePayload) -> Self {
        Self {
            parts: payload.parts().iter().map(|p| to_hex_prefixed(p)).collect(),
            digest: to_hex_prefixed(&payload.digest()),
        }
    }
}

/// Digest with the hashes it was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashResponse {
    pub hash: String,
    pub domain_separator: String,
    /// Absent for domain-only documents
    pub struct_hash: Option<String>,
}

impl From<&SignablePayload> for HashResponse {
    fn from(payload: &SignablePayload) -> Self {
        Self {
            hash: to_hex_prefixed(&payload.digest()),
            domain_separator: to_hex_prefixed(&payload.domain_separator),
            struct_hash: payload.struct_hash.map(|h| to_hex_prefixed(&h)),
        }
    }
}

/// Signature over a typed-data digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponse {
    /// 65-byte `r ‖ s ‖ v`
    pub signature: String,
    pub r: String,
    pub s: String,
    pub v: u8,
    /// The digest that was signed
    pub hash: String,
}

impl SignResponse {
    pub fn new(signature: &Eip712Signature, hash: &[u8; 32]) -> Self {
        Self {
            signature: signature.to_hex(),
            r: to_hex_prefixed(&signature.r),
            s: to_hex_prefixed(&signature.s),
            v: signature.v,
            hash: to_hex_prefixed(hash),
        }
    }
}

/// Canonical type string of a struct and its type hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSignatureResponse {
    pub type_name: String,
    pub type_signature: String,
    pub type_hash: String,
}

// =============================================================================
// API Response Wrapper
// =============================================================================

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<crate::error::CoreError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::CoreError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}
