//! ABI (Application Binary Interface) tuple encoding for Solidity/EVM values
//!
//! This is the primitive the EIP-712 data encoder hands its `(type, value)`
//! sequences to:
//! - Solidity value types (uintN, intN, address, bool, bytesN)
//! - Dynamic bytes, strings, arrays and tuples (head/tail layout)

pub mod types;
pub mod encoder;


pub use types::*;
pub use encoder::*;
