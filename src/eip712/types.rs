//! EIP-712 Type Definitions
//!
//! Core data structures for EIP-712 typed data signing.

use crate::abi::AbiError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use zeroize::Zeroize;

/// Name of the implicit domain struct every document carries
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// Most array suffixes a single field type may carry
pub const MAX_ARRAY_DIMENSIONS: usize = 64;

/// Schema table: struct name -> ordered field descriptors
pub type Types = HashMap<String, Vec<TypedDataField>>;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "Person[]")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Shape of a declared field type, parsed once from its type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Reference to another struct in the schema table
    Struct(String),
    /// `T[N]`
    FixedArray(Box<FieldType>, usize),
    /// `T[]`
    DynArray(Box<FieldType>),
    /// Dynamic `bytes`, hashed before encoding
    Bytes,
    /// Dynamic `string`, hashed before encoding
    String,
    /// Any other type name, handed to the ABI encoder unchanged
    Primitive(String),
}

impl FieldType {
    /// Classify a raw type string against the schema table.
    ///
    /// Array element types are everything before the last `[`, so
    /// `Person[2][]` is a dynamic array of `Person[2]`. More than
    /// `MAX_ARRAY_DIMENSIONS` suffixes fail with `DepthExceeded`.
    pub fn parse(type_name: &str, types: &Types) -> Result<Self, Eip712Error> {
        // Outermost suffix first
        let mut dimensions: Vec<Option<usize>> = Vec::new();
        let mut element = type_name;
        while element.ends_with(']') {
            if dimensions.len() == MAX_ARRAY_DIMENSIONS {
                return Err(Eip712Error::DepthExceeded(MAX_ARRAY_DIMENSIONS));
            }
            let open = element
                .rfind('[')
                .ok_or_else(|| Eip712Error::MalformedType(type_name.to_string()))?;
            let size = &element[open + 1..element.len() - 1];
            element = &element[..open];

            if element.is_empty() {
                return Err(Eip712Error::MalformedType(type_name.to_string()));
            }
            if size.is_empty() {
                dimensions.push(None);
            } else {
                let len = size
                    .parse::<usize>()
                    .map_err(|_| Eip712Error::MalformedType(type_name.to_string()))?;
                dimensions.push(Some(len));
            }
        }

        let base = if types.contains_key(element) {
            FieldType::Struct(element.to_string())
        } else {
            match element {
                "bytes" => FieldType::Bytes,
                "string" => FieldType::String,
                other => FieldType::Primitive(other.to_string()),
            }
        };

        Ok(dimensions.into_iter().rev().fold(base, |inner, dimension| match dimension {
            Some(len) => FieldType::FixedArray(Box::new(inner), len),
            None => FieldType::DynArray(Box::new(inner)),
        }))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Struct(name) | FieldType::Primitive(name) => write!(f, "{}", name),
            FieldType::FixedArray(element, len) => write!(f, "{}[{}]", element, len),
            FieldType::DynArray(element) => write!(f, "{}[]", element),
            FieldType::Bytes => write!(f, "bytes"),
            FieldType::String => write!(f, "string"),
        }
    }
}

/// Leaf value of a value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Raw bytes supplied programmatically (JSON carries bytes as hex strings)
    Bytes(Vec<u8>),
}

/// A value tree matched against a struct's declared fields at encode time
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit `null`; treated the same as a missing key
    #[default]
    Null,
    Scalar(Scalar),
    Struct(BTreeMap<String, Value>),
    Array(Vec<Value>),
}

impl Value {
    /// Build a struct value from `(field, value)` pairs
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(s.into()))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Scalar(Scalar::Bytes(bytes.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a struct member; `None` for absent members and non-struct values
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.get(field),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short description of the value's shape for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(Scalar::Bool(_)) => "bool",
            Value::Scalar(Scalar::Number(_)) => "number",
            Value::Scalar(Scalar::String(_)) => "string",
            Value::Scalar(Scalar::Bytes(_)) => "bytes",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
        }
    }

    /// Convert back to JSON; raw bytes become `0x` hex strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Scalar(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            Value::Scalar(Scalar::Number(n)) => serde_json::Value::Number(n.clone()),
            Value::Scalar(Scalar::String(s)) => serde_json::Value::String(s.clone()),
            Value::Scalar(Scalar::Bytes(b)) => {
                serde_json::Value::String(format!("0x{}", hex::encode(b)))
            }
            Value::Struct(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => Value::Scalar(Scalar::Number(n)),
            serde_json::Value::String(s) => Value::Scalar(Scalar::String(s)),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Struct(
                fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Complete EIP-712 typed data document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    /// Type definitions (struct name -> fields); must contain `EIP712Domain`
    pub types: Types,

    /// The name of the primary type being signed
    pub primary_type: String,

    /// Values for the `EIP712Domain` struct
    pub domain: Value,

    /// Values for `primary_type`; unused when it is `EIP712Domain`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl TypedData {
    /// Parse typed data from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Eip712Error> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            Eip712Error::InvalidDocument {
                reason: format!("invalid JSON: {}", e),
                document: json.to_string(),
            }
        })?;
        Self::from_value(value)
    }

    /// Build typed data from an already parsed JSON document
    pub fn from_value(value: serde_json::Value) -> Result<Self, Eip712Error> {
        let document = value.to_string();
        serde_json::from_value(value).map_err(|e| Eip712Error::InvalidDocument {
            reason: e.to_string(),
            document,
        })
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, Eip712Error> {
        serde_json::to_string(self).map_err(|e| Eip712Error::InvalidDocument {
            reason: e.to_string(),
            document: format!("{:?}", self),
        })
    }

    /// Whether only the domain is being signed
    pub fn is_domain_only(&self) -> bool {
        self.primary_type == DOMAIN_TYPE
    }

    /// Pre-flight check of the schema table.
    ///
    /// Hashing does not require this; it reports schema problems up front
    /// rather than at the first field that trips over them.
    pub fn validate(&self) -> Result<(), Eip712Error> {
        if !self.types.contains_key(DOMAIN_TYPE) {
            return Err(Eip712Error::UndefinedType(DOMAIN_TYPE.to_string()));
        }
        if !self.types.contains_key(&self.primary_type) {
            return Err(Eip712Error::UndefinedType(self.primary_type.clone()));
        }

        for (type_name, fields) in &self.types {
            if fields.is_empty() {
                return Err(Eip712Error::EmptyType(type_name.clone()));
            }
            for field in fields {
                validate_field_type(&FieldType::parse(&field.type_name, &self.types)?)?;
            }
        }

        Ok(())
    }
}

fn validate_field_type(field_type: &FieldType) -> Result<(), Eip712Error> {
    match field_type {
        FieldType::FixedArray(element, _) | FieldType::DynArray(element) => {
            validate_field_type(element)
        }
        FieldType::Primitive(name) => name
            .parse::<crate::abi::AbiType>()
            .map(|_| ())
            .map_err(|_| Eip712Error::UndefinedType(name.clone())),
        FieldType::Struct(_) | FieldType::Bytes | FieldType::String => Ok(()),
    }
}

/// EIP-712 signature components
#[derive(Debug, Clone, Zeroize)]
#[zeroize(drop)]
pub struct Eip712Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// v component (recovery id + 27)
    pub v: u8,
}

impl Eip712Signature {
    /// Create from raw components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// Errors that can occur during EIP-712 operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Eip712Error {
    /// A struct reference that is not in the schema table
    #[error("Undefined type: {0}")]
    UndefinedType(String),

    /// A struct with no fields
    #[error("No type definition specified: {0}")]
    EmptyType(String),

    /// An array type string that cannot be split into element and size
    #[error("Malformed type: {0}")]
    MalformedType(String),

    #[error("Missing value for field {field} of type {type_name}")]
    MissingField { field: String, type_name: String },

    #[error("Invalid value for field {field} of type {type_name}: {reason}")]
    InvalidValue {
        field: String,
        type_name: String,
        reason: String,
    },

    #[error("Field {field} expects {expected} elements, got {actual}")]
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Maximum encoding depth of {0} exceeded")]
    DepthExceeded(usize),

    #[error("Encoding failed for {context}: {source}")]
    Encoding { context: String, source: AbiError },

    #[error("Invalid typed-data document: {reason}")]
    InvalidDocument { reason: String, document: String },

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing error: {0}")]
    SigningError(String),
}

impl Eip712Error {
    /// Schema table problems (undefined, empty or malformed types)
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Eip712Error::UndefinedType(_) | Eip712Error::EmptyType(_) | Eip712Error::MalformedType(_)
        )
    }

    /// Lookup and shape failures that document entry points report as
    /// `InvalidDocument`
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Eip712Error::UndefinedType(_)
                | Eip712Error::MalformedType(_)
                | Eip712Error::InvalidValue { .. }
        )
    }
}
