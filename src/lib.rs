//! EIP-712 Core Library
//!
//! Canonical encoding, hashing and signing of EIP-712 typed structured data.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712**: type resolution, recursive data encoding, payload assembly, signing
//! - **abi**: the Solidity ABI tuple encoder the data encoder feeds
//! - **utils**: keccak256, encoder settings, structured logging
//! - **ffi**: C-ABI exports for host applications
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `eip712_free_string`)
//!
//! # Security
//!
//! Private keys are held in `PrivateKey`, which is zeroized on drop and
//! never logged.
//!
//! # Example
//!
//! ```rust,ignore
//! use eip712_core::{hash_typed_data, TypedData};
//!
//! let typed_data = TypedData::from_json(json_string)?;
//! println!("digest: 0x{}", hex::encode(hash_typed_data(&typed_data)?));
//! ```

pub mod error;
pub mod types;
pub mod ffi;
pub mod abi;
pub mod eip712;
pub mod utils;

// Re-export key types for convenience
pub use error::{CoreError, ErrorCode};
pub use types::*;

pub use eip712::{
    encode_data,
    encode_type,
    encode_typed_data,
    hash_struct,
    hash_typed_data,
    sign_typed_data,
    Eip712Error,
    Eip712Signature,
    PrivateKey,
    SignablePayload,
    TypedData,
    Value,
};

pub use utils::config::EncodingSettings;
pub use utils::crypto::keccak256;

// Re-export FFI functions at crate root
pub use ffi::{eip712_encode, eip712_free_string, eip712_hash, eip712_sign};
