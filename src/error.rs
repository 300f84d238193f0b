//! Unified error types for the outer surfaces
//!
//! Library functions return `Eip712Error`; the FFI layer and the CLI
//! convert into `CoreError` so callers see one stable, serialisable
//! shape with a snake_case code.

use crate::eip712::Eip712Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for FFI and CLI responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl CoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for CoreError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidDocument,
    InvalidPrivateKey,

    // Schema errors
    SchemaError,

    // Data errors
    MissingField,
    InvalidValue,
    ArrayLength,
    DepthExceeded,
    EncodingError,

    // Crypto errors
    SigningFailed,

    // Parse errors
    ParseError,
}

impl From<Eip712Error> for CoreError {
    fn from(e: Eip712Error) -> Self {
        let code = match &e {
            Eip712Error::UndefinedType(_)
            | Eip712Error::EmptyType(_)
            | Eip712Error::MalformedType(_) => ErrorCode::SchemaError,
            Eip712Error::MissingField { .. } => ErrorCode::MissingField,
            Eip712Error::InvalidValue { .. } => ErrorCode::InvalidValue,
            Eip712Error::ArrayLength { .. } => ErrorCode::ArrayLength,
            Eip712Error::DepthExceeded(_) => ErrorCode::DepthExceeded,
            Eip712Error::Encoding { .. } => ErrorCode::EncodingError,
            Eip712Error::InvalidDocument { .. } => ErrorCode::InvalidDocument,
            Eip712Error::InvalidPrivateKey(_) => ErrorCode::InvalidPrivateKey,
            Eip712Error::SigningError(_) => ErrorCode::SigningFailed,
        };

        let error = CoreError::new(code, e.to_string());
        match e {
            Eip712Error::InvalidDocument { document, .. } => error.with_details(document),
            _ => error,
        }
    }
}
