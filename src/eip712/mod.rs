//! EIP-712 Typed Data Hashing
//!
//! Canonical encoding and hashing of typed structured data, plus a thin
//! secp256k1 signing pass-through over the resulting digest.
//!
//! - [`resolver`]: struct dependency sets and canonical type strings
//! - [`encoder`]: recursive `encodeData` / `hashStruct`
//! - [`hasher`]: the `0x1901 ‖ domainSeparator ‖ hashStruct(message)` payload
//! - [`signer`]: deterministic ECDSA over the payload digest
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use eip712_core::eip712::{hash_typed_data, sign_typed_data, PrivateKey, TypedData};
//!
//! let typed_data = TypedData::from_json(json_string)?;
//! let digest = hash_typed_data(&typed_data)?;
//! let signature = sign_typed_data(&typed_data, &PrivateKey::from_hex(key_hex)?)?;
//! ```

pub mod types;
pub mod resolver;
pub mod encoder;
pub mod hasher;
pub mod signer;

pub use types::*;
pub use resolver::*;
pub use encoder::*;
pub use hasher::*;
pub use signer::*;
