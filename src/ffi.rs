//! FFI Layer for EIP-712 Core
//!
//! All C-ABI exports are defined here. This is the ONLY file that should
//! contain `extern "C"` functions. All functions follow a consistent pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `eip712_free_string`)
//!
//! Error handling: All functions return JSON with `success` field.
//! On error, `success: false` and `error` object is populated.
//!
//! Encoder settings come from the environment (`EIP712_MAX_DEPTH`,
//! `EIP712_STRICT_ARRAYS`).

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::de::DeserializeOwned;
use zeroize::Zeroize;

use crate::eip712::{self, PrivateKey, TypedData};
use crate::error::CoreError;
use crate::types::*;
use crate::utils::config::EncodingSettings;

const LOG_MODULE: &str = "ffi";

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any eip712_* function
///
/// # Safety
/// The pointer must have been returned by an eip712_* function
#[unsafe(no_mangle)]
pub extern "C" fn eip712_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert C string to an owned Rust string, returning error JSON if invalid
fn parse_input(input: *const c_char) -> Result<String, *mut c_char> {
    if input.is_null() {
        return Err(error_response(CoreError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    match c_str.to_str() {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(error_response(CoreError::invalid_input("Invalid UTF-8 string"))),
    }
}

/// Parse a JSON request body
fn parse_request<T: DeserializeOwned>(input: *const c_char) -> Result<T, *mut c_char> {
    let json_str = parse_input(input)?;
    serde_json::from_str(&json_str)
        .map_err(|e| error_response(CoreError::parse_error(format!("Invalid request: {}", e))))
}

/// Parse a typed-data document, mapping shape problems to `invalid_document`
fn parse_typed_data(value: serde_json::Value) -> Result<TypedData, *mut c_char> {
    TypedData::from_value(value).map_err(|e| error_response(e.into()))
}

fn settings() -> EncodingSettings {
    let settings = EncodingSettings::from_env();
    for warning in settings.validate() {
        crate::log_warn!(LOG_MODULE, "encoding settings", warning = warning);
    }
    settings
}

/// Create a success response JSON string
fn success_response<T: serde::Serialize>(data: T) -> *mut c_char {
    let response = ApiResponse::ok(data);
    string_to_ptr(response.to_json())
}

/// Create an error response JSON string
fn error_response(error: CoreError) -> *mut c_char {
    crate::log_debug!(LOG_MODULE, "request failed", code = format!("{:?}", error.code));
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        // Last resort: return a minimal error
        Err(_) => c"{\"success\":false,\"error\":{\"code\":\"internal\",\"message\":\"String conversion failed\"}}"
            .to_owned()
            .into_raw(),
    }
}

// =============================================================================
// EIP-712 Operations
// =============================================================================

/// Build the signable payload of a typed-data document
///
/// # Input
/// ```json
/// {
///   "types": { ... },
///   "primaryType": "Mail",
///   "domain": { ... },
///   "message": { ... }
/// }
/// ```
///
/// # Output
/// ```json
/// {
///   "success": true,
///   "data": {
///     "parts": ["0x1901", "0x...", "0x..."],
///     "digest": "0x..."
///   }
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn eip712_encode(input: *const c_char) -> *mut c_char {
    let typed_data = match parse_request(input).and_then(parse_typed_data) {
        Ok(t) => t,
        Err(ptr) => return ptr,
    };

    match eip712::encode_typed_data_with_settings(&typed_data, &settings()) {
        Ok(payload) => success_response(EncodeResponse::from(&payload)),
        Err(e) => error_response(e.into()),
    }
}

/// Hash EIP-712 typed data
///
/// # Input
/// Same document as `eip712_encode`.
///
/// # Output
/// ```json
/// {
///   "success": true,
///   "data": {
///     "hash": "0x...",
///     "domainSeparator": "0x...",
///     "structHash": "0x..."
///   }
/// }
/// ```
/// `structHash` is `null` when `primaryType` is `EIP712Domain`.
#[unsafe(no_mangle)]
pub extern "C" fn eip712_hash(input: *const c_char) -> *mut c_char {
    let typed_data = match parse_request(input).and_then(parse_typed_data) {
        Ok(t) => t,
        Err(ptr) => return ptr,
    };

    match eip712::encode_typed_data_with_settings(&typed_data, &settings()) {
        Ok(payload) => success_response(HashResponse::from(&payload)),
        Err(e) => error_response(e.into()),
    }
}

/// Sign EIP-712 typed data
///
/// # Input
/// ```json
/// {
///   "typedData": { ... },
///   "privateKey": "0x..."
/// }
/// ```
///
/// # Output
/// ```json
/// {
///   "success": true,
///   "data": {
///     "signature": "0x...",
///     "r": "0x...",
///     "s": "0x...",
///     "v": 27,
///     "hash": "0x..."
///   }
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn eip712_sign(input: *const c_char) -> *mut c_char {
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SignRequest {
        typed_data: serde_json::Value,
        private_key: String,
    }

    let SignRequest {
        typed_data,
        mut private_key,
    } = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let parsed_key = PrivateKey::from_hex(&private_key);
    private_key.zeroize();
    let private_key = match parsed_key {
        Ok(k) => k,
        Err(e) => return error_response(e.into()),
    };

    let typed_data = match parse_typed_data(typed_data) {
        Ok(t) => t,
        Err(ptr) => return ptr,
    };

    let settings = settings();
    let hash = match eip712::hash_typed_data_with_settings(&typed_data, &settings) {
        Ok(h) => h,
        Err(e) => return error_response(e.into()),
    };

    match eip712::sign_hash(&hash, &private_key) {
        Ok(signature) => success_response(SignResponse::new(&signature, &hash)),
        Err(e) => error_response(e.into()),
    }
}
