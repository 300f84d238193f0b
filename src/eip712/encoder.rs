//! EIP-712 Data Encoding
//!
//! Implements `encodeData`: a struct becomes the ABI tuple
//! `(typeHash, member_1, ..., member_n)` where struct members, arrays,
//! `bytes` and `string` are replaced by their keccak256 hash and every
//! other member is handed to the ABI encoder as-is.

use super::resolver::{struct_fields, type_hash};
use super::types::*;
use crate::abi::{AbiEncoder, AbiError, AbiType, AbiValue, I256, U256};
use crate::utils::config::EncodingSettings;
use crate::utils::crypto::{decode_hex, keccak256, to_hex_prefixed};

const LOG_MODULE: &str = "eip712::encoder";

/// Encode a struct value under `type_name` with default settings
pub fn encode_data(type_name: &str, data: &Value, types: &Types) -> Result<Vec<u8>, Eip712Error> {
    encode_data_with_settings(type_name, data, types, &EncodingSettings::default())
}

/// Encode a struct value under `type_name`
pub fn encode_data_with_settings(
    type_name: &str,
    data: &Value,
    types: &Types,
    settings: &EncodingSettings,
) -> Result<Vec<u8>, Eip712Error> {
    let encoder = StructEncoder { types, settings };
    encoder.encode_struct(type_name, data, encoder.descend(0)?)
}

/// hashStruct(s) = keccak256(encodeData(s))
pub fn hash_struct(type_name: &str, data: &Value, types: &Types) -> Result<[u8; 32], Eip712Error> {
    hash_struct_with_settings(type_name, data, types, &EncodingSettings::default())
}

/// hashStruct with explicit settings
pub fn hash_struct_with_settings(
    type_name: &str,
    data: &Value,
    types: &Types,
    settings: &EncodingSettings,
) -> Result<[u8; 32], Eip712Error> {
    let hash = keccak256(&encode_data_with_settings(type_name, data, types, settings)?);
    crate::log_debug!(
        LOG_MODULE,
        "hashed struct",
        struct_type = type_name,
        struct_hash = to_hex_prefixed(&hash),
    );
    Ok(hash)
}

/// Recursive encoder over one schema table
struct StructEncoder<'a> {
    types: &'a Types,
    settings: &'a EncodingSettings,
}

impl StructEncoder<'_> {
    /// Depth of the next nesting level, bounded by `max_depth`
    fn descend(&self, depth: usize) -> Result<usize, Eip712Error> {
        let next = depth + 1;
        if next > self.settings.max_depth {
            return Err(Eip712Error::DepthExceeded(self.settings.max_depth));
        }
        Ok(next)
    }

    fn encode_struct(&self, type_name: &str, data: &Value, depth: usize) -> Result<Vec<u8>, Eip712Error> {
        let fields = struct_fields(type_name, self.types)?;

        let type_hash = type_hash(type_name, self.types)?;
        crate::log_debug!(
            LOG_MODULE,
            "resolved type hash",
            struct_type = type_name,
            type_hash = to_hex_prefixed(&type_hash),
            depth = depth,
        );

        let mut abi_types = vec![AbiType::WORD];
        let mut abi_values = vec![AbiValue::word(type_hash)];

        let members = data.as_struct().ok_or_else(|| Eip712Error::InvalidValue {
            field: type_name.to_string(),
            type_name: type_name.to_string(),
            reason: format!("expected a struct, got {}", data.kind()),
        })?;

        for field in fields {
            let field_type = FieldType::parse(&field.type_name, self.types)?;
            let value = members.get(&field.name).filter(|v| !v.is_null());
            let (abi_type, abi_value) = self.encode_field(&field.name, &field_type, value, depth)?;
            abi_types.push(abi_type);
            abi_values.push(abi_value);
        }

        AbiEncoder::encode(&abi_values, &abi_types).map_err(|source| Eip712Error::Encoding {
            context: type_name.to_string(),
            source,
        })
    }

    /// Resolve one member to the `(type, value)` pair it contributes
    fn encode_field(
        &self,
        name: &str,
        field_type: &FieldType,
        value: Option<&Value>,
        depth: usize,
    ) -> Result<(AbiType, AbiValue), Eip712Error> {
        // Absent struct members encode as a zero word; everything else is required
        let value = match (field_type, value) {
            (FieldType::Struct(struct_type), None) => {
                crate::log_debug!(
                    LOG_MODULE,
                    "absent struct member encoded as zero word",
                    field = name,
                    struct_type = struct_type,
                );
                return Ok((AbiType::WORD, AbiValue::word([0u8; 32])));
            }
            (_, None) => {
                return Err(Eip712Error::MissingField {
                    field: name.to_string(),
                    type_name: field_type.to_string(),
                })
            }
            (_, Some(value)) => value,
        };

        match field_type {
            FieldType::Struct(struct_type) => {
                let encoded = self.encode_struct(struct_type, value, self.descend(depth)?)?;
                Ok((AbiType::WORD, AbiValue::word(keccak256(&encoded))))
            }
            FieldType::Bytes => {
                let bytes = dynamic_bytes(name, value)?;
                Ok((AbiType::WORD, AbiValue::word(keccak256(&bytes))))
            }
            FieldType::String => match value {
                Value::Scalar(Scalar::String(s)) => {
                    Ok((AbiType::WORD, AbiValue::word(keccak256(s.as_bytes()))))
                }
                other => Err(invalid_value(name, field_type, format!("expected a string, got {}", other.kind()))),
            },
            FieldType::FixedArray(element, len) => {
                self.encode_array(name, field_type, element, Some(*len), value, depth)
            }
            FieldType::DynArray(element) => {
                self.encode_array(name, field_type, element, None, value, depth)
            }
            FieldType::Primitive(type_name) => {
                let abi_type: AbiType = type_name.parse().map_err(|source| Eip712Error::Encoding {
                    context: name.to_string(),
                    source,
                })?;
                // Range checks happen here so failures name the field
                let abi_value = coerce_primitive(&abi_type, value)
                    .and_then(|v| AbiEncoder::encode_value(&v, &abi_type).map(|_| v))
                    .map_err(|source| Eip712Error::Encoding {
                        context: name.to_string(),
                        source,
                    })?;
                Ok((abi_type, abi_value))
            }
        }
    }

    /// Arrays hash the tuple encoding of their elements.
    ///
    /// `T[N]` and `T[]` encode identically; `N` is only checked when
    /// `strict_array_length` is set.
    fn encode_array(
        &self,
        name: &str,
        field_type: &FieldType,
        element: &FieldType,
        fixed_len: Option<usize>,
        value: &Value,
        depth: usize,
    ) -> Result<(AbiType, AbiValue), Eip712Error> {
        let items = value.as_array().ok_or_else(|| {
            invalid_value(name, field_type, format!("expected an array, got {}", value.kind()))
        })?;

        if let Some(expected) = fixed_len {
            if self.settings.strict_array_length && items.len() != expected {
                return Err(Eip712Error::ArrayLength {
                    field: name.to_string(),
                    expected,
                    actual: items.len(),
                });
            }
        }

        let inner = self.descend(depth)?;
        let mut abi_types = Vec::with_capacity(items.len());
        let mut abi_values = Vec::with_capacity(items.len());
        for item in items {
            let item = Some(item).filter(|v| !v.is_null());
            let (abi_type, abi_value) = self.encode_field(name, element, item, inner)?;
            abi_types.push(abi_type);
            abi_values.push(abi_value);
        }

        let encoded = AbiEncoder::encode(&abi_values, &abi_types).map_err(|source| {
            Eip712Error::Encoding {
                context: name.to_string(),
                source,
            }
        })?;
        Ok((AbiType::WORD, AbiValue::word(keccak256(&encoded))))
    }
}

fn invalid_value(name: &str, field_type: &FieldType, reason: String) -> Eip712Error {
    Eip712Error::InvalidValue {
        field: name.to_string(),
        type_name: field_type.to_string(),
        reason,
    }
}

/// Raw bytes of a `bytes` member: programmatic bytes or a `0x` hex string
fn dynamic_bytes(name: &str, value: &Value) -> Result<Vec<u8>, Eip712Error> {
    match value {
        Value::Scalar(Scalar::Bytes(bytes)) => Ok(bytes.clone()),
        Value::Scalar(Scalar::String(s)) if s.starts_with("0x") || s.starts_with("0X") => {
            decode_hex(s).map_err(|e| invalid_value(name, &FieldType::Bytes, format!("invalid hex: {}", e)))
        }
        other => Err(invalid_value(
            name,
            &FieldType::Bytes,
            format!("expected bytes or a 0x-prefixed hex string, got {}", other.kind()),
        )),
    }
}

/// Convert a leaf value into the ABI value for a primitive type
pub fn coerce_primitive(abi_type: &AbiType, value: &Value) -> Result<AbiValue, AbiError> {
    let mismatch = || AbiError::TypeMismatch {
        expected: abi_type.canonical_type(),
        got: value.kind().to_string(),
    };

    match (abi_type, value) {
        (AbiType::Uint(_), Value::Scalar(Scalar::Number(n))) => match n.as_u64() {
            Some(u) => Ok(AbiValue::Uint(U256::from(u))),
            // Literals past u64 keep their digits; fractions and exponents fail here
            None => U256::from_dec(&n.to_string())
                .map(AbiValue::Uint)
                .map_err(|_| AbiError::InvalidValue(format!("{} is not an unsigned integer", n))),
        },
        (AbiType::Uint(_), Value::Scalar(Scalar::String(s))) => AbiValue::uint256_from_str(s.trim()),

        (AbiType::Int(_), Value::Scalar(Scalar::Number(n))) => {
            if let Some(i) = n.as_i64() {
                Ok(AbiValue::Int(I256::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(AbiValue::Int(I256(U256::from(u), false)))
            } else {
                I256::from_dec(&n.to_string())
                    .map(AbiValue::Int)
                    .map_err(|_| AbiError::InvalidValue(format!("{} is not an integer", n)))
            }
        }
        (AbiType::Int(_), Value::Scalar(Scalar::String(s))) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(digits) => Ok(AbiValue::Int(I256(U256::from_hex(digits)?, false))),
                None => Ok(AbiValue::Int(I256::from_dec(s)?)),
            }
        }

        (AbiType::Address, Value::Scalar(Scalar::String(s))) => AbiValue::address_from_str(s.trim()),
        (AbiType::Address, Value::Scalar(Scalar::Bytes(bytes))) => {
            let addr: [u8; 20] = bytes.as_slice().try_into().map_err(|_| {
                AbiError::InvalidValue(format!("address must be 20 bytes, got {}", bytes.len()))
            })?;
            Ok(AbiValue::Address(addr))
        }

        (AbiType::Bool, Value::Scalar(Scalar::Bool(b))) => Ok(AbiValue::Bool(*b)),

        (AbiType::FixedBytes(_), Value::Scalar(Scalar::String(s))) => decode_hex(s.trim())
            .map(AbiValue::FixedBytes)
            .map_err(|e| AbiError::InvalidValue(format!("invalid hex: {}", e))),
        (AbiType::FixedBytes(_), Value::Scalar(Scalar::Bytes(bytes))) => {
            Ok(AbiValue::FixedBytes(bytes.clone()))
        }

        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod encoder_tests {
    use super::*;
    use serde_json::json;

    fn types_from(json: serde_json::Value) -> Types {
        serde_json::from_value(json).unwrap()
    }

    fn note_types() -> Types {
        types_from(json!({
            "Person": [{"name": "name", "type": "string"}],
            "Note": [
                {"name": "author", "type": "Person"},
                {"name": "body", "type": "string"},
                {"name": "data", "type": "bytes"},
                {"name": "delta", "type": "int256"},
                {"name": "ok", "type": "bool"},
                {"name": "tag", "type": "bytes4"}
            ]
        }))
    }

    fn note(author: serde_json::Value) -> Value {
        Value::from(json!({
            "author": author,
            "body": "hi",
            "data": "0xdeadbeef",
            "delta": -5,
            "ok": true,
            "tag": "0x01020304"
        }))
    }

    #[test]
    fn test_null_struct_member_is_zero_word() {
        let encoded = encode_data("Note", &note(serde_json::Value::Null), &note_types()).unwrap();

        assert_eq!(encoded.len(), 7 * 32);
        assert_eq!(
            hex::encode(&encoded[..32]),
            "1eb432b40715249ad10e6e0d539cc2a3db9b0fa0a42621ac7ef5972bc22f93a0"
        );
        assert_eq!(&encoded[32..64], &[0u8; 32]);
        assert_eq!(
            hex::encode(keccak256(&encoded)),
            "6bf0a0bed79a1ecdf0fe9f523104e16a3b29627b80fb430d1b33ada634186b5d"
        );
    }

    #[test]
    fn test_missing_struct_member_matches_null() {
        let types = note_types();
        let mut value = note(serde_json::Value::Null);
        if let Value::Struct(fields) = &mut value {
            fields.remove("author");
        }

        assert_eq!(
            encode_data("Note", &value, &types).unwrap(),
            encode_data("Note", &note(serde_json::Value::Null), &types).unwrap()
        );
    }

    #[test]
    fn test_present_struct_member_is_hashed() {
        let types = note_types();
        let encoded = encode_data("Note", &note(json!({"name": "Cow"})), &types).unwrap();

        let person = encode_data("Person", &Value::from(json!({"name": "Cow"})), &types).unwrap();
        assert_eq!(&encoded[32..64], &keccak256(&person));
    }

    #[test]
    fn test_missing_scalar_fails() {
        let types = note_types();
        for field in ["body", "data", "delta", "ok", "tag"] {
            let mut value = note(serde_json::Value::Null);
            if let Value::Struct(fields) = &mut value {
                fields.insert(field.to_string(), Value::Null);
            }

            match encode_data("Note", &value, &types) {
                Err(Eip712Error::MissingField { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected MissingField for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_raw_bytes_match_hex_bytes() {
        let types = note_types();
        let mut raw = note(serde_json::Value::Null);
        if let Value::Struct(fields) = &mut raw {
            fields.insert("data".to_string(), Value::bytes(vec![0xde, 0xad, 0xbe, 0xef]));
        }

        assert_eq!(
            encode_data("Note", &raw, &types).unwrap(),
            encode_data("Note", &note(serde_json::Value::Null), &types).unwrap()
        );
    }

    #[test]
    fn test_bytes_requires_hex_prefix() {
        let types = note_types();
        let mut value = note(serde_json::Value::Null);
        if let Value::Struct(fields) = &mut value {
            fields.insert("data".to_string(), Value::string("deadbeef"));
        }

        assert!(matches!(
            encode_data("Note", &value, &types),
            Err(Eip712Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_string_shape_mismatch() {
        let types = note_types();
        let mut value = note(serde_json::Value::Null);
        if let Value::Struct(fields) = &mut value {
            fields.insert("body".to_string(), Value::from(json!(42)));
        }

        assert!(matches!(
            encode_data("Note", &value, &types),
            Err(Eip712Error::InvalidValue { field, .. }) if field == "body"
        ));
    }

    #[test]
    fn test_primitive_mismatch_is_encoding_error() {
        let types = note_types();
        let mut value = note(serde_json::Value::Null);
        if let Value::Struct(fields) = &mut value {
            fields.insert("ok".to_string(), Value::string("yes"));
        }

        assert!(matches!(
            encode_data("Note", &value, &types),
            Err(Eip712Error::Encoding { context, .. }) if context == "ok"
        ));
    }

    #[test]
    fn test_struct_value_must_be_object() {
        let types = note_types();
        assert!(matches!(
            encode_data("Person", &Value::string("Cow"), &types),
            Err(Eip712Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_fixed_and_dynamic_arrays_encode_alike() {
        let types = types_from(json!({
            "Fixed": [{"name": "v", "type": "uint256[3]"}],
            "Dyn": [{"name": "v", "type": "uint256[]"}]
        }));
        let value = Value::from(json!({"v": [1, 2, 3]}));

        let fixed = encode_data("Fixed", &value, &types).unwrap();
        let dynamic = encode_data("Dyn", &value, &types).unwrap();

        // Only the type hash differs
        assert_ne!(&fixed[..32], &dynamic[..32]);
        assert_eq!(&fixed[32..], &dynamic[32..]);

        let mut words = Vec::new();
        for i in 1u8..=3 {
            let mut word = [0u8; 32];
            word[31] = i;
            words.extend_from_slice(&word);
        }
        assert_eq!(&fixed[32..], &keccak256(&words));
    }

    #[test]
    fn test_fixed_array_length_is_permissive_by_default() {
        let types = types_from(json!({"Pair": [{"name": "v", "type": "uint8[2]"}]}));
        let value = Value::from(json!({"v": [1, 2, 3]}));

        assert!(encode_data("Pair", &value, &types).is_ok());

        let strict = EncodingSettings::strict();
        assert_eq!(
            encode_data_with_settings("Pair", &value, &types, &strict),
            Err(Eip712Error::ArrayLength {
                field: "v".to_string(),
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_null_struct_array_element_is_zero_word() {
        let types = types_from(json!({
            "Item": [{"name": "id", "type": "uint256"}],
            "Cart": [{"name": "items", "type": "Item[]"}]
        }));
        let value = Value::from(json!({"items": [null]}));

        let encoded = encode_data("Cart", &value, &types).unwrap();
        assert_eq!(&encoded[32..], &keccak256(&[0u8; 32]));
    }

    #[test]
    fn test_null_scalar_array_element_fails() {
        let types = types_from(json!({"Bag": [{"name": "ids", "type": "uint256[]"}]}));
        let value = Value::from(json!({"ids": [1, null]}));

        assert!(matches!(
            encode_data("Bag", &value, &types),
            Err(Eip712Error::MissingField { .. })
        ));
    }

    #[test]
    fn test_depth_guard_on_cyclic_schema() {
        let types = types_from(json!({
            "Node": [{"name": "value", "type": "uint256"}, {"name": "next", "type": "Node"}]
        }));

        let mut chain = json!({"value": 0, "next": null});
        for i in 1..10 {
            chain = json!({"value": i, "next": chain});
        }
        let value = Value::from(chain);

        assert!(encode_data("Node", &value, &types).is_ok());

        let shallow = EncodingSettings::standard().with_max_depth(5);
        assert_eq!(
            encode_data_with_settings("Node", &value, &types, &shallow),
            Err(Eip712Error::DepthExceeded(5))
        );
    }

    #[test]
    fn test_depth_guard_counts_arrays() {
        let types = types_from(json!({"Grid": [{"name": "cells", "type": "uint8[][]"}]}));
        let value = Value::from(json!({"cells": [[1, 2], [3]]}));

        let settings = EncodingSettings::standard().with_max_depth(2);
        assert_eq!(
            encode_data_with_settings("Grid", &value, &types, &settings),
            Err(Eip712Error::DepthExceeded(2))
        );
        let settings = EncodingSettings::standard().with_max_depth(3);
        assert!(encode_data_with_settings("Grid", &value, &types, &settings).is_ok());
    }

    #[test]
    fn test_deeply_nested_array_type_is_rejected() {
        let field_type = format!("uint8{}", "[]".repeat(200_000));
        let types = types_from(json!({"Deep": [{"name": "v", "type": field_type}]}));

        assert_eq!(
            encode_data("Deep", &Value::from(json!({"v": []})), &types),
            Err(Eip712Error::DepthExceeded(MAX_ARRAY_DIMENSIONS))
        );
    }

    #[test]
    fn test_coerce_primitive() {
        let uint: AbiType = "uint256".parse().unwrap();
        assert_eq!(
            coerce_primitive(&uint, &Value::from(json!("0x10"))).unwrap(),
            AbiValue::Uint(U256::from(16))
        );
        assert_eq!(
            coerce_primitive(&uint, &Value::from(json!("1000000000000000000"))).unwrap(),
            AbiValue::Uint(U256::from(1_000_000_000_000_000_000))
        );
        assert!(coerce_primitive(&uint, &Value::from(json!(-1))).is_err());
        assert!(coerce_primitive(&uint, &Value::from(json!(1.5))).is_err());

        let int: AbiType = "int64".parse().unwrap();
        assert_eq!(
            coerce_primitive(&int, &Value::from(json!("-7"))).unwrap(),
            AbiValue::Int(I256::from(-7))
        );

        let address = AbiType::Address;
        assert_eq!(
            coerce_primitive(&address, &Value::bytes(vec![0xab; 20])).unwrap(),
            AbiValue::Address([0xab; 20])
        );
        assert!(coerce_primitive(&address, &Value::from(json!(true))).is_err());
    }

    #[test]
    fn test_integer_literals_beyond_u64() {
        let types = types_from(json!({
            "Transfer": [
                {"name": "value", "type": "uint256"},
                {"name": "delta", "type": "int128"}
            ]
        }));
        let parse = |json: &str| Value::from(serde_json::from_str::<serde_json::Value>(json).unwrap());

        let as_number = parse(r#"{"value": 1000000000000000000000, "delta": -1000000000000000000000}"#);
        let as_string = parse(r#"{"value": "1000000000000000000000", "delta": "-1000000000000000000000"}"#);
        assert_eq!(
            hash_struct("Transfer", &as_number, &types).unwrap(),
            hash_struct("Transfer", &as_string, &types).unwrap()
        );

        let uint: AbiType = "uint256".parse().unwrap();
        assert!(coerce_primitive(&uint, &parse("1e21")).is_err());
        assert!(coerce_primitive(&uint, &parse("1000000000000000000000.5")).is_err());
        assert_eq!(
            coerce_primitive(&uint, &parse("18446744073709551616")).unwrap(),
            AbiValue::Uint(U256::from_dec("18446744073709551616").unwrap())
        );
    }
}
