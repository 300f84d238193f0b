//! ABI tuple encoder for Solidity/EVM values

use super::types::*;

/// ABI encoder
pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode a single value according to its type
    pub fn encode_value(value: &AbiValue, abi_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        match (value, abi_type) {
            (AbiValue::Uint(u), AbiType::Uint(bits)) => {
                if u.bits() > *bits {
                    return Err(AbiError::EncodingError(format!(
                        "value 0x{} does not fit in uint{}",
                        u.to_hex().trim_start_matches('0'),
                        bits
                    )));
                }
                Ok(u.to_be_bytes().to_vec())
            }

            (AbiValue::Int(i), AbiType::Int(bits)) => {
                if !i.fits(*bits) {
                    return Err(AbiError::EncodingError(format!(
                        "value does not fit in int{}",
                        bits
                    )));
                }
                Ok(i.to_be_bytes().to_vec())
            }

            (AbiValue::Address(addr), AbiType::Address) => {
                let mut result = [0u8; 32];
                result[12..].copy_from_slice(addr);
                Ok(result.to_vec())
            }

            (AbiValue::Bool(b), AbiType::Bool) => {
                let mut result = [0u8; 32];
                result[31] = u8::from(*b);
                Ok(result.to_vec())
            }

            // Fixed bytes are right-padded
            (AbiValue::FixedBytes(bytes), AbiType::FixedBytes(size)) => {
                if bytes.len() > *size {
                    return Err(AbiError::EncodingError(format!(
                        "{} bytes exceed bytes{}",
                        bytes.len(),
                        size
                    )));
                }
                let mut result = [0u8; 32];
                result[..bytes.len()].copy_from_slice(bytes);
                Ok(result.to_vec())
            }

            (AbiValue::Bytes(bytes), AbiType::Bytes) => Ok(Self::encode_dynamic_bytes(bytes)),

            (AbiValue::String(s), AbiType::String) => Ok(Self::encode_dynamic_bytes(s.as_bytes())),

            (AbiValue::Array(values), AbiType::Array(inner_type)) => {
                Self::encode_dynamic_array(values, inner_type)
            }

            (AbiValue::Array(values), AbiType::FixedArray(inner_type, size)) => {
                if values.len() != *size {
                    return Err(AbiError::TypeMismatch {
                        expected: format!("array of size {}", size),
                        got: format!("array of size {}", values.len()),
                    });
                }
                Self::encode_fixed_array(values, inner_type)
            }

            (AbiValue::Tuple(values), AbiType::Tuple(types)) => {
                if values.len() != types.len() {
                    return Err(AbiError::TypeMismatch {
                        expected: format!("tuple of {} elements", types.len()),
                        got: format!("tuple of {} elements", values.len()),
                    });
                }
                Self::encode_tuple(values, types)
            }

            _ => Err(AbiError::TypeMismatch {
                expected: abi_type.canonical_type(),
                got: value.get_type().canonical_type(),
            }),
        }
    }

    /// Encode parallel type and value sequences as one tuple
    pub fn encode(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        if values.len() != types.len() {
            return Err(AbiError::EncodingError(format!(
                "Value count {} doesn't match type count {}",
                values.len(),
                types.len()
            )));
        }

        Self::encode_tuple(values, types)
    }

    /// Encode a tuple: static head followed by the dynamic tail
    fn encode_tuple(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        let head_size: usize = types.iter().map(|t| t.head_size()).sum();

        let mut head = Vec::with_capacity(head_size);
        let mut tail = Vec::new();

        for (value, abi_type) in values.iter().zip(types.iter()) {
            let encoded = Self::encode_value(value, abi_type)?;
            if abi_type.is_dynamic() {
                let offset = U256::from((head_size + tail.len()) as u64);
                head.extend_from_slice(&offset.to_be_bytes());
                tail.extend_from_slice(&encoded);
            } else {
                head.extend_from_slice(&encoded);
            }
        }

        head.extend_from_slice(&tail);
        Ok(head)
    }

    /// Length word followed by the data, zero-padded to a multiple of 32
    fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
        let padded_len = bytes.len().div_ceil(32) * 32;

        let mut result = Vec::with_capacity(32 + padded_len);
        result.extend_from_slice(&U256::from(bytes.len() as u64).to_be_bytes());
        result.extend_from_slice(bytes);
        result.resize(32 + padded_len, 0);
        result
    }

    fn encode_dynamic_array(values: &[AbiValue], inner_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        let mut result = Vec::new();
        result.extend_from_slice(&U256::from(values.len() as u64).to_be_bytes());

        let types = vec![inner_type.clone(); values.len()];
        result.extend_from_slice(&Self::encode_tuple(values, &types)?);
        Ok(result)
    }

    fn encode_fixed_array(values: &[AbiValue], inner_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        // No length prefix for fixed arrays
        let types = vec![inner_type.clone(); values.len()];
        Self::encode_tuple(values, &types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uint256() {
        let value = AbiValue::Uint(U256::from(256));
        let encoded = AbiEncoder::encode_value(&value, &AbiType::Uint(256)).unwrap();

        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[30], 1);
        assert_eq!(encoded[31], 0);
    }

    #[test]
    fn test_encode_uint_out_of_range() {
        let value = AbiValue::Uint(U256::from(256));
        let err = AbiEncoder::encode_value(&value, &AbiType::Uint(8)).unwrap_err();
        assert!(matches!(err, AbiError::EncodingError(_)));
    }

    #[test]
    fn test_encode_negative_int() {
        let value = AbiValue::Int(I256::from(-1));
        let encoded = AbiEncoder::encode_value(&value, &AbiType::Int(8)).unwrap();
        assert_eq!(encoded, vec![0xff; 32]);

        let too_small = AbiValue::Int(I256::from(-129));
        assert!(AbiEncoder::encode_value(&too_small, &AbiType::Int(8)).is_err());
    }

    #[test]
    fn test_encode_address() {
        let mut addr = [0u8; 20];
        addr[0] = 0xde;
        addr[19] = 0xad;

        let encoded = AbiEncoder::encode_value(&AbiValue::Address(addr), &AbiType::Address).unwrap();

        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[12], 0xde);
        assert_eq!(encoded[31], 0xad);
    }

    #[test]
    fn test_encode_bool() {
        let encoded_true = AbiEncoder::encode_value(&AbiValue::Bool(true), &AbiType::Bool).unwrap();
        let encoded_false = AbiEncoder::encode_value(&AbiValue::Bool(false), &AbiType::Bool).unwrap();

        assert_eq!(encoded_true[31], 1);
        assert_eq!(encoded_false[31], 0);
    }

    #[test]
    fn test_encode_fixed_bytes() {
        let value = AbiValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let encoded = AbiEncoder::encode_value(&value, &AbiType::FixedBytes(4)).unwrap();

        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(encoded[4..].iter().all(|b| *b == 0));

        let too_long = AbiValue::FixedBytes(vec![0u8; 5]);
        assert!(AbiEncoder::encode_value(&too_long, &AbiType::FixedBytes(4)).is_err());
    }

    #[test]
    fn test_encode_dynamic_bytes() {
        let value = AbiValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let encoded = AbiEncoder::encode_value(&value, &AbiType::Bytes).unwrap();

        // 32 bytes for length + 32 bytes for padded data
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 4);
        assert_eq!(&encoded[32..36], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_encode_static_tuple() {
        let values = vec![AbiValue::Uint(U256::from(100)), AbiValue::Bool(true)];
        let types = vec![AbiType::Uint(256), AbiType::Bool];

        let encoded = AbiEncoder::encode(&values, &types).unwrap();

        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 100);
        assert_eq!(encoded[63], 1);
    }

    #[test]
    fn test_encode_count_mismatch() {
        let err = AbiEncoder::encode(&[AbiValue::Bool(true)], &[]).unwrap_err();
        assert!(matches!(err, AbiError::EncodingError(_)));
    }

    #[test]
    fn test_encode_type_mismatch() {
        let err = AbiEncoder::encode_value(&AbiValue::Bool(true), &AbiType::Address).unwrap_err();
        assert_eq!(
            err,
            AbiError::TypeMismatch {
                expected: "address".to_string(),
                got: "bool".to_string(),
            }
        );
    }

    #[test]
    fn test_encode_dynamic_array() {
        let value = AbiValue::Array(vec![
            AbiValue::Uint(U256::from(1)),
            AbiValue::Uint(U256::from(2)),
            AbiValue::Uint(U256::from(3)),
        ]);

        let encoded =
            AbiEncoder::encode_value(&value, &AbiType::Array(Box::new(AbiType::Uint(256)))).unwrap();

        // 32 (length) + 3 * 32 (elements)
        assert_eq!(encoded.len(), 128);
        assert_eq!(encoded[31], 3);
        assert_eq!(encoded[63], 1);
        assert_eq!(encoded[95], 2);
        assert_eq!(encoded[127], 3);
    }

    #[test]
    fn test_encode_mixed_dynamic_static() {
        // (uint256, string, uint256)
        let values = vec![
            AbiValue::Uint(U256::from(42)),
            AbiValue::String("test".to_string()),
            AbiValue::Uint(U256::from(100)),
        ];
        let types = vec![AbiType::Uint(256), AbiType::String, AbiType::Uint(256)];

        let encoded = AbiEncoder::encode(&values, &types).unwrap();

        // Head: 3 words, tail: length word + one padded data word
        assert_eq!(encoded.len(), 160);
        assert_eq!(encoded[31], 42);
        assert_eq!(encoded[63], 96);
        assert_eq!(encoded[95], 100);
        assert_eq!(encoded[127], 4);
        assert_eq!(&encoded[128..132], b"test");
    }
}
