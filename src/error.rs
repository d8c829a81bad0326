//! # Error Types
//!
//! Error handling for the tagwire codec.
//!
//! Decoding and encoding fail in different ways and are reported through
//! different types:
//!
//! - [`DecodeError`]: the input bytes are malformed or truncated. These are
//!   data-corruption errors and are terminal for the current decode call.
//! - [`EncodeError`]: the record does not satisfy its schema, or the caller
//!   supplied a buffer of the wrong size. These are programming errors.
//!
//! [`CodecError`] wraps both, together with configuration and schema
//! construction failures, for callers that want a single error type.
//!
//! ## Example Usage
//! ```rust
//! use tagwire::error::{CodecError, DecodeError};
//! use tagwire::core::varint::decode_varint;
//!
//! let err = decode_varint(&[0x80], 0).unwrap_err();
//! assert_eq!(err, DecodeError::UnexpectedEndOfInput);
//!
//! let wrapped: CodecError = err.into();
//! assert!(wrapped.to_string().contains("unexpected end of input"));
//! ```

use crate::core::wire::WireType;
use std::io;
use thiserror::Error;

/// Static error messages shared by the codec paths.
pub mod constants {
    /// Tag-level wire format violations
    pub const ERR_END_GROUP_FOR_NON_GROUP: &str = "wiretype end group for non-group";
    pub const ERR_ILLEGAL_FIELD_NUMBER: &str = "illegal field number 0";
    pub const ERR_FIELD_NUMBER_TOO_LARGE: &str = "field number exceeds maximum";

    /// Schema construction errors
    pub const ERR_DUPLICATE_FIELD_NUMBER: &str = "duplicate field number";
    pub const ERR_DUPLICATE_FIELD_NAME: &str = "duplicate field name";
    pub const ERR_EMPTY_FIELD_NAME: &str = "field name cannot be empty";
    pub const ERR_DEFAULT_TYPE_MISMATCH: &str = "default value does not match field type";
    pub const ERR_MESSAGE_DEFAULT: &str = "message fields cannot declare a default";
}

/// Failure while decoding bytes into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("integer overflow: varint longer than 10 bytes")]
    IntegerOverflow,

    #[error("invalid length: {0}")]
    InvalidLength(u64),

    #[error("wrong wire type {actual:?} for field {field} (expected {expected:?})")]
    WireTypeMismatch {
        field: u32,
        expected: WireType,
        actual: WireType,
    },

    #[error("wire format error: {0}")]
    WireFormatError(String),

    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("invalid UTF-8 in string field {0}")]
    InvalidUtf8(u32),

    #[error("required field {0} not set")]
    MissingRequiredField(u32),

    #[error("record too large: {0} bytes")]
    RecordTooLarge(usize),
}

/// Failure while encoding a record. Always a caller bug, never bad input data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("required field {0} not set")]
    MissingRequiredField(u32),

    #[error("always-present field {0} not set")]
    MissingAlwaysField(u32),

    #[error("field {0} is not part of schema")]
    UnknownField(u32),

    #[error("field {field} expects a {expected} value, found {found}")]
    TypeMismatch {
        field: u32,
        expected: &'static str,
        found: &'static str,
    },

    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("size mismatch: estimated {expected} bytes, wrote {written}")]
    SizeMismatch { expected: usize, written: usize },
}

/// Crate-level error covering every fallible tagwire operation.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages() {
        let err = DecodeError::WireTypeMismatch {
            field: 3,
            expected: WireType::Varint,
            actual: WireType::Fixed32,
        };
        assert_eq!(
            err.to_string(),
            "wrong wire type Fixed32 for field 3 (expected Varint)"
        );
        assert_eq!(
            DecodeError::WireFormatError(constants::ERR_END_GROUP_FOR_NON_GROUP.to_string())
                .to_string(),
            "wire format error: wiretype end group for non-group"
        );
    }

    #[test]
    fn test_codec_error_wraps_both_sides() {
        let decode: CodecError = DecodeError::IntegerOverflow.into();
        assert!(matches!(decode, CodecError::Decode(DecodeError::IntegerOverflow)));

        let encode: CodecError = EncodeError::UnknownField(9).into();
        assert!(matches!(encode, CodecError::Encode(EncodeError::UnknownField(9))));
        assert_eq!(
            encode.to_string(),
            "Encode error: field 9 is not part of schema"
        );
    }
}
