//! # Record Codec
//!
//! Schema-driven encode, decode, and size for whole records.
//!
//! A [`Codec`] carries the decode limits; the crate-level [`encode`], [`decode`]
//! and [`size`] functions use the default limits.
//!
//! ## Wire Format
//! ```text
//! [Tag varint][Value] [Tag varint][Value] ...
//! ```
//! No length prefix, magic bytes, or checksum: a record is exactly its fields.
//!
//! ## Usage
//! ```rust
//! use tagwire::codec::Codec;
//! use tagwire::record::{Record, Value};
//! use tagwire::schema::{FieldSpec, FieldType, Schema};
//!
//! let schema = Schema::builder("B")
//!     .field(FieldSpec::optional(1, "String", FieldType::String))
//!     .field(FieldSpec::always(2, "Int64", FieldType::Int64))
//!     .field(FieldSpec::optional(3, "Int32", FieldType::Int32).with_default(1234i32))
//!     .build()?;
//!
//! let codec = Codec::default();
//! let record = Record::new().with(1, "hi").with(2, 5i64);
//! let bytes = codec.encode(&record, &schema)?;
//! assert_eq!(bytes, [0x0A, 0x02, 0x68, 0x69, 0x10, 0x05]);
//!
//! let decoded = codec.decode(&bytes, &schema)?;
//! assert_eq!(decoded, record);
//! assert_eq!(schema.value_or_default(&decoded, 3).as_deref(), Some(&Value::I32(1234)));
//! # Ok::<(), tagwire::error::CodecError>(())
//! ```

mod decode;
mod encode;
mod size;

pub use size::encoded_len;

use crate::config::{CodecConfig, LimitsConfig};
use crate::error::{DecodeError, EncodeError};
use crate::record::Record;
use crate::schema::Schema;
use crate::utils::metrics::global_metrics;
use bytes::BytesMut;
use decode::{check_required, decode_fields, DecodeState};
use tracing::debug;

/// Encoder/decoder bound to a set of decode limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    limits: LimitsConfig,
}

impl Codec {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.limits)
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Exact encoded length of `record`
    pub fn size(&self, record: &Record, schema: &Schema) -> Result<usize, EncodeError> {
        encoded_len(record, schema)
    }

    /// Encode into a new, exactly-sized buffer
    pub fn encode(&self, record: &Record, schema: &Schema) -> Result<Vec<u8>, EncodeError> {
        let result = encode::encode(record, schema);
        record_encode(schema, result.as_ref().map(Vec::len));
        result
    }

    /// Encode into `buf` at `offset`; returns the offset after the last byte
    pub fn encode_to(
        &self,
        record: &Record,
        schema: &Schema,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<usize, EncodeError> {
        let result = encode::encode_to(record, schema, buf, offset);
        record_encode(schema, result.as_ref().map(|end| end - offset));
        result
    }

    /// Append to `dst`; returns the number of bytes added
    pub fn encode_into(
        &self,
        record: &Record,
        schema: &Schema,
        dst: &mut BytesMut,
    ) -> Result<usize, EncodeError> {
        let result = encode::encode_into(record, schema, dst);
        record_encode(schema, result.as_ref().copied());
        result
    }

    /// Decode a complete record. On error nothing is returned.
    ///
    /// `Always` fields missing from the input are set to their defaults.
    pub fn decode(&self, buf: &[u8], schema: &Schema) -> Result<Record, DecodeError> {
        let mut record = Record::new();
        self.decode_into(buf, schema, &mut record)?;
        Ok(record)
    }

    /// Decode `buf` and merge it over `record`: scalars overwrite, nested
    /// messages merge. On error `record` is left untouched.
    pub fn decode_merge(
        &self,
        buf: &[u8],
        schema: &Schema,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        let mut merged = record.clone();
        self.decode_into(buf, schema, &mut merged)?;
        *record = merged;
        Ok(())
    }

    fn decode_into(
        &self,
        buf: &[u8],
        schema: &Schema,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        let metrics = global_metrics();
        let mut state = DecodeState::new(self.limits);

        let result = if buf.len() > self.limits.max_record_size {
            Err(DecodeError::RecordTooLarge(buf.len()))
        } else {
            decode_fields(buf, schema, record, 0, &mut state).and_then(|()| {
                schema.fill_always(record);
                check_required(record, schema)
            })
        };

        metrics.unknown_fields_skipped(state.unknown_skipped);
        match &result {
            Ok(()) => {
                metrics.record_decoded(buf.len() as u64);
                debug!(
                    schema = schema.name(),
                    bytes = buf.len(),
                    fields = record.len(),
                    unknown = state.unknown_skipped,
                    "Decoded record"
                );
            }
            Err(e) => {
                metrics.decode_failed();
                debug!(schema = schema.name(), bytes = buf.len(), error = %e, "Decode failed");
            }
        }
        result
    }
}

fn record_encode(schema: &Schema, result: Result<usize, &EncodeError>) {
    let metrics = global_metrics();
    match result {
        Ok(bytes) => {
            metrics.record_encoded(bytes as u64);
            debug!(schema = schema.name(), bytes, "Encoded record");
        }
        Err(e) => {
            metrics.encode_failed();
            debug!(schema = schema.name(), error = %e, "Encode failed");
        }
    }
}

/// Encode with default limits
pub fn encode(record: &Record, schema: &Schema) -> Result<Vec<u8>, EncodeError> {
    Codec::default().encode(record, schema)
}

/// Encode into `buf` at `offset` with default limits
pub fn encode_to(
    record: &Record,
    schema: &Schema,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize, EncodeError> {
    Codec::default().encode_to(record, schema, buf, offset)
}

/// Decode with default limits
pub fn decode(buf: &[u8], schema: &Schema) -> Result<Record, DecodeError> {
    Codec::default().decode(buf, schema)
}

/// Exact encoded length of `record`
pub fn size(record: &Record, schema: &Schema) -> Result<usize, EncodeError> {
    encoded_len(record, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use crate::schema::{FieldSpec, FieldType};

    #[allow(clippy::unwrap_used)]
    fn schema() -> Schema {
        Schema::builder("T")
            .field(FieldSpec::optional(1, "name", FieldType::String))
            .field(FieldSpec::optional(2, "count", FieldType::Uint64))
            .build()
            .unwrap()
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_encode_updates_metrics() {
        let codec = Codec::default();
        let schema = schema();
        let metrics = global_metrics();

        let failed = metrics.snapshot().encode_errors;
        let bad = Record::new().with(1, 5u64);
        assert!(codec.encode(&bad, &schema).is_err());
        assert!(codec.encode_into(&bad, &schema, &mut BytesMut::new()).is_err());
        assert!(metrics.snapshot().encode_errors >= failed + 2);

        let encoded = metrics.snapshot().records_encoded;
        let mut buf = [0u8; 8];
        codec
            .encode_to(&Record::new().with(2, 3u64), &schema, &mut buf, 1)
            .unwrap();
        assert!(metrics.snapshot().records_encoded > encoded);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_fills_always_fields() {
        let schema = Schema::builder("A")
            .field(FieldSpec::optional(1, "name", FieldType::String))
            .field(FieldSpec::always(2, "count", FieldType::Int64).with_default(9i64))
            .build()
            .unwrap();

        let decoded = decode(&[0x0A, 0x01, b'x'], &schema).unwrap();
        assert_eq!(decoded, Record::new().with(1, "x").with(2, 9i64));

        let bytes = encode(&decoded, &schema).unwrap();
        assert_eq!(decode(&bytes, &schema), Ok(decoded));
    }

    #[test]
    fn test_record_size_limit() {
        let codec = Codec::new(LimitsConfig {
            max_depth: 4,
            max_record_size: 3,
        });
        assert_eq!(
            codec.decode(&[0x10, 0x01, 0x10, 0x02], &schema()),
            Err(DecodeError::RecordTooLarge(4))
        );
        assert!(codec.decode(&[0x10, 0x01], &schema()).is_ok());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_merge_keeps_record_on_error() {
        let codec = Codec::default();
        let schema = schema();
        let mut record = Record::new().with(1, "keep");

        codec.decode_merge(&[0x10, 0x07], &schema, &mut record).unwrap();
        assert_eq!(record.get(1), Some(&Value::Str("keep".into())));
        assert_eq!(record.get(2), Some(&Value::U64(7)));

        let before = record.clone();
        assert!(codec
            .decode_merge(&[0x10, 0x08, 0x0A, 0x05], &schema, &mut record)
            .is_err());
        assert_eq!(record, before);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_size_matches_encode() {
        let schema = schema();
        let record = Record::new().with(1, "x".repeat(300)).with(2, u64::MAX);
        let bytes = encode(&record, &schema).unwrap();
        assert_eq!(size(&record, &schema), Ok(bytes.len()));
        assert_eq!(decode(&bytes, &schema), Ok(record));
    }
}
