//! ABI type definitions for Solidity/EVM tuple encoding

use std::fmt;
use std::str::FromStr;

/// Solidity types understood by the tuple encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// Unsigned integer of the given bit width (8..=256, multiple of 8)
    Uint(usize),

    /// Signed integer of the given bit width (8..=256, multiple of 8)
    Int(usize),

    // Address (20 bytes)
    Address,

    // Boolean
    Bool,

    /// Fixed-size bytes (bytes1 through bytes32)
    FixedBytes(usize),

    // Dynamic bytes
    Bytes,

    // Dynamic string
    String,

    // Dynamic array T[]
    Array(Box<AbiType>),

    // Fixed-size array T[N]
    FixedArray(Box<AbiType>, usize),

    // Tuple (struct)
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// The 32-byte word type every hashed EIP-712 member is encoded as
    pub const WORD: AbiType = AbiType::FixedBytes(32);

    /// Check if the type is dynamic (requires offset encoding)
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(components) => components.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Get the size in bytes for static types (32 for most)
    pub fn head_size(&self) -> usize {
        match self {
            AbiType::Tuple(components) if !self.is_dynamic() => {
                components.iter().map(|t| t.head_size()).sum()
            }
            AbiType::FixedArray(inner, size) if !self.is_dynamic() => {
                inner.head_size() * size
            }
            _ => 32, // All other types use 32 bytes in head
        }
    }

    /// Parse tuple components handling nested parentheses
    fn parse_tuple_components(s: &str) -> Result<Vec<AbiType>, AbiError> {
        let mut components = Vec::new();
        let mut current = String::new();
        let mut depth = 0;

        for c in s.chars() {
            match c {
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    if !current.trim().is_empty() {
                        components.push(current.trim().parse()?);
                    }
                    current.clear();
                }
                _ => current.push(c),
            }
        }

        if !current.trim().is_empty() {
            components.push(current.trim().parse()?);
        }

        Ok(components)
    }

    fn parse_bits(kind: &str, size_str: &str) -> Result<usize, AbiError> {
        if size_str.is_empty() {
            return Ok(256);
        }
        let bits: usize = size_str
            .parse()
            .map_err(|_| AbiError::InvalidType(format!("Invalid {} size: {}", kind, size_str)))?;
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(AbiError::InvalidType(format!("Unsupported {} size: {}", kind, bits)));
        }
        Ok(bits)
    }

    /// Get the canonical type string
    pub fn canonical_type(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{}", bits),
            AbiType::Int(bits) => format!("int{}", bits),
            AbiType::Address => "address".to_string(),
            AbiType::Bool => "bool".to_string(),
            AbiType::FixedBytes(size) => format!("bytes{}", size),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::String => "string".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical_type()),
            AbiType::FixedArray(inner, size) => format!("{}[{}]", inner.canonical_type(), size),
            AbiType::Tuple(components) => {
                let inner = components
                    .iter()
                    .map(|t| t.canonical_type())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({})", inner)
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Handle arrays first
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(AbiType::Array(Box::new(inner.parse()?)));
        }

        // Fixed array T[N]
        if s.ends_with(']') {
            let idx = s
                .rfind('[')
                .ok_or_else(|| AbiError::InvalidType(format!("Unbalanced array type: {}", s)))?;
            let size_str = &s[idx + 1..s.len() - 1];
            let size: usize = size_str
                .parse()
                .map_err(|_| AbiError::InvalidType(format!("Invalid array size: {}", size_str)))?;
            return Ok(AbiType::FixedArray(Box::new(s[..idx].parse()?), size));
        }

        // Handle tuples
        if s.starts_with('(') && s.ends_with(')') {
            let inner = &s[1..s.len() - 1];
            if inner.is_empty() {
                return Ok(AbiType::Tuple(vec![]));
            }
            return Ok(AbiType::Tuple(Self::parse_tuple_components(inner)?));
        }

        match s {
            "address" => Ok(AbiType::Address),
            "bool" => Ok(AbiType::Bool),
            "bytes" => Ok(AbiType::Bytes),
            "string" => Ok(AbiType::String),

            s if s.starts_with("bytes") => {
                let size_str = &s[5..];
                let size: usize = size_str
                    .parse()
                    .map_err(|_| AbiError::InvalidType(format!("Invalid bytes size: {}", size_str)))?;
                if size == 0 || size > 32 {
                    return Err(AbiError::InvalidType(format!("bytes size must be 1-32: {}", size)));
                }
                Ok(AbiType::FixedBytes(size))
            }

            s if s.starts_with("uint") => Ok(AbiType::Uint(Self::parse_bits("uint", &s[4..])?)),
            s if s.starts_with("int") => Ok(AbiType::Int(Self::parse_bits("int", &s[3..])?)),

            _ => Err(AbiError::InvalidType(format!("Unknown type: {}", s))),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

/// ABI value - runtime representation of Solidity values
#[derive(Debug, Clone, PartialEq)]
pub enum AbiValue {
    // Unsigned integers (stored as U256 internally)
    Uint(U256),

    // Signed integers (stored as I256 internally)
    Int(I256),

    // Address (20 bytes)
    Address([u8; 20]),

    // Boolean
    Bool(bool),

    // Fixed-size bytes
    FixedBytes(Vec<u8>),

    // Dynamic bytes
    Bytes(Vec<u8>),

    // Dynamic string
    String(String),

    // Array (dynamic or fixed)
    Array(Vec<AbiValue>),

    // Tuple (struct)
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// A `bytes32` word
    pub fn word(bytes: [u8; 32]) -> Self {
        AbiValue::FixedBytes(bytes.to_vec())
    }

    /// Create a Uint256 value from a string (decimal or hex)
    pub fn uint256_from_str(s: &str) -> Result<Self, AbiError> {
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(digits) => U256::from_hex(digits),
            None => U256::from_dec(s),
        }?;
        Ok(AbiValue::Uint(value))
    }

    /// Create an Address value from a hex string
    pub fn address_from_str(s: &str) -> Result<Self, AbiError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 40 {
            return Err(AbiError::InvalidValue("Address must be 20 bytes".to_string()));
        }
        let bytes = hex::decode(s)
            .map_err(|_| AbiError::InvalidValue("Invalid hex in address".to_string()))?;
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&bytes);
        Ok(AbiValue::Address(addr))
    }

    /// Get the type of this value
    pub fn get_type(&self) -> AbiType {
        match self {
            AbiValue::Uint(_) => AbiType::Uint(256),
            AbiValue::Int(_) => AbiType::Int(256),
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::FixedBytes(b) => AbiType::FixedBytes(b.len()),
            AbiValue::Bytes(_) => AbiType::Bytes,
            AbiValue::String(_) => AbiType::String,
            AbiValue::Array(values) => match values.first() {
                Some(first) => AbiType::Array(Box::new(first.get_type())),
                None => AbiType::Array(Box::new(AbiType::Uint(256))),
            },
            AbiValue::Tuple(values) => {
                AbiType::Tuple(values.iter().map(|v| v.get_type()).collect())
            }
        }
    }
}

/// 256-bit unsigned integer, little-endian limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256(pub [u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0, 0, 0, 0]);
    pub const ONE: U256 = U256([1, 0, 0, 0]);
    pub const MAX: U256 = U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX]);

    /// Create from u64
    pub fn from(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    /// Create from bytes (big-endian, at most 32 bytes)
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let mut padded = [0u8; 32];
        let len = bytes.len().min(32);
        padded[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);

        let mut result = [0u64; 4];
        for (i, limb) in result.iter_mut().enumerate() {
            let offset = (3 - i) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&padded[offset..offset + 8]);
            *limb = u64::from_be_bytes(chunk);
        }
        U256(result)
    }

    /// Convert to bytes (big-endian, 32 bytes)
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        bytes
    }

    /// Parse from hex string (without 0x prefix, odd lengths allowed)
    pub fn from_hex(s: &str) -> Result<Self, AbiError> {
        if s.is_empty() {
            return Err(AbiError::InvalidValue("Empty hex quantity".to_string()));
        }
        let padded;
        let digits = if s.len() % 2 == 1 {
            padded = format!("0{}", s);
            padded.as_str()
        } else {
            s
        };
        let bytes = hex::decode(digits)
            .map_err(|_| AbiError::InvalidValue(format!("Invalid hex quantity: {}", s)))?;

        let significant = bytes.iter().skip_while(|b| **b == 0).count();
        if significant > 32 {
            return Err(AbiError::Overflow);
        }
        Ok(Self::from_be_bytes(&bytes))
    }

    /// Parse from decimal string
    pub fn from_dec(s: &str) -> Result<Self, AbiError> {
        if s.is_empty() {
            return Err(AbiError::InvalidValue("Empty decimal quantity".to_string()));
        }
        let mut result = U256::ZERO;
        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| AbiError::InvalidValue(format!("Invalid decimal digit: {}", c)))?;
            result = result.checked_mul_u64(10).ok_or(AbiError::Overflow)?;
            result = result
                .checked_add(U256::from(digit as u64))
                .ok_or(AbiError::Overflow)?;
        }
        Ok(result)
    }

    /// Checked addition
    pub fn checked_add(&self, other: U256) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, c1) = self.0[i].overflowing_add(other.0[i]);
            let (sum2, c2) = sum1.overflowing_add(carry);
            result[i] = sum2;
            carry = (c1 as u64) + (c2 as u64);
        }

        if carry != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Checked multiplication by u64
    pub fn checked_mul_u64(&self, other: u64) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u128;

        for i in 0..4 {
            let prod = (self.0[i] as u128) * (other as u128) + carry;
            result[i] = prod as u64;
            carry = prod >> 64;
        }

        if carry != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }

    /// Number of significant bits
    pub fn bits(&self) -> usize {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return i * 64 + (64 - self.0[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Get as u64 (truncates)
    pub fn as_u64(&self) -> u64 {
        self.0[0]
    }

    /// To hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }
}

/// 256-bit signed integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256(pub U256, pub bool); // (abs value, is_negative)

impl I256 {
    pub const ZERO: I256 = I256(U256::ZERO, false);

    /// Create from i64
    pub fn from(value: i64) -> Self {
        I256(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Parse a decimal string with an optional leading `-`
    pub fn from_dec(s: &str) -> Result<Self, AbiError> {
        match s.strip_prefix('-') {
            Some(digits) => {
                let magnitude = U256::from_dec(digits)?;
                Ok(I256(magnitude, !magnitude.is_zero()))
            }
            None => Ok(I256(U256::from_dec(s)?, false)),
        }
    }

    /// Whether the value is representable as a two's complement integer of `bits` width
    pub fn fits(&self, bits: usize) -> bool {
        let magnitude_bits = self.0.bits();
        if !self.1 {
            return magnitude_bits < bits;
        }
        // -2^(bits-1) is the one negative value whose magnitude needs `bits` bits
        if magnitude_bits < bits {
            return true;
        }
        magnitude_bits == bits && self.0.0.iter().map(|l| l.count_ones()).sum::<u32>() == 1
    }

    /// Convert to bytes (big-endian, two's complement, 32 bytes)
    pub fn to_be_bytes(&self) -> [u8; 32] {
        if !self.1 {
            return self.0.to_be_bytes();
        }

        // Negative: invert and add one
        let mut bytes = self.0.to_be_bytes();
        for b in &mut bytes {
            *b = !*b;
        }
        for i in (0..32).rev() {
            let (sum, overflow) = bytes[i].overflowing_add(1);
            bytes[i] = sum;
            if !overflow {
                break;
            }
        }
        bytes
    }
}

/// ABI errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Invalid type specification
    InvalidType(String),
    /// Invalid value for type
    InvalidValue(String),
    /// Encoding error
    EncodingError(String),
    /// Type mismatch
    TypeMismatch { expected: String, got: String },
    /// Overflow
    Overflow,
}

impl fmt::Display for AbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiError::InvalidType(s) => write!(f, "Invalid type: {}", s),
            AbiError::InvalidValue(s) => write!(f, "Invalid value: {}", s),
            AbiError::EncodingError(s) => write!(f, "Encoding error: {}", s),
            AbiError::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            AbiError::Overflow => write!(f, "Numeric overflow"),
        }
    }
}

impl std::error::Error for AbiError {}
