//! Field decoder.
//!
//! A tag loop over the input:
//!
//! ```text
//! ReadTag -> Dispatch -> { ReadValue | Skip } -> ReadTag ... -> end of input
//! ```
//!
//! Running out of input exactly on a tag boundary ends the record; anywhere
//! else it is an error. Known fields must arrive with the wire type their
//! schema declares. Unknown fields are skipped without allocation.

use crate::config::LimitsConfig;
use crate::core::skip::{advance, length_delimited, skip_value};
use crate::core::varint::{decode_varint, zigzag_decode_32, zigzag_decode_64};
use crate::core::wire::{decode_tag, WireType};
use crate::error::{constants, DecodeError};
use crate::record::{Record, Value};
use crate::schema::{FieldSpec, FieldType, Presence, Schema};
use bytes::Bytes;
use tracing::trace;

/// Per-call decode state
pub(crate) struct DecodeState {
    pub(crate) limits: LimitsConfig,
    pub(crate) unknown_skipped: u64,
}

impl DecodeState {
    pub(crate) fn new(limits: LimitsConfig) -> Self {
        Self {
            limits,
            unknown_skipped: 0,
        }
    }
}

/// Decode `buf` as a complete record under `schema`, merging into `record`.
///
/// Scalars overwrite (last one wins); nested messages merge field by field.
pub(crate) fn decode_fields(
    buf: &[u8],
    schema: &Schema,
    record: &mut Record,
    depth: usize,
    state: &mut DecodeState,
) -> Result<(), DecodeError> {
    let mut pos = 0;
    while pos < buf.len() {
        let (tag, next) = decode_tag(buf, pos)?;
        if tag.wire_type == WireType::EndGroup {
            return Err(DecodeError::WireFormatError(
                constants::ERR_END_GROUP_FOR_NON_GROUP.to_string(),
            ));
        }

        pos = match schema.field(tag.field_number) {
            Some(spec) => {
                let expected = spec.wire_type();
                if tag.wire_type != expected {
                    return Err(DecodeError::WireTypeMismatch {
                        field: tag.field_number,
                        expected,
                        actual: tag.wire_type,
                    });
                }
                read_field(buf, next, spec, record, depth, state)?
            }
            None => {
                trace!(
                    schema = schema.name(),
                    field = tag.field_number,
                    wire_type = ?tag.wire_type,
                    "Skipping unknown field"
                );
                state.unknown_skipped += 1;
                skip_value(buf, next, tag.wire_type, depth, state.limits.max_depth)?
            }
        };
    }
    Ok(())
}

fn read_field(
    buf: &[u8],
    pos: usize,
    spec: &FieldSpec,
    record: &mut Record,
    depth: usize,
    state: &mut DecodeState,
) -> Result<usize, DecodeError> {
    let (value, next) = match &spec.field_type {
        FieldType::Int32
        | FieldType::Int64
        | FieldType::Uint32
        | FieldType::Uint64
        | FieldType::Sint32
        | FieldType::Sint64
        | FieldType::Bool => {
            let (raw, next) = decode_varint(buf, pos)?;
            (varint_value(&spec.field_type, raw), next)
        }
        FieldType::Fixed32 | FieldType::Sfixed32 | FieldType::Float => {
            let end = advance(buf, pos, 4)?;
            let mut le = [0u8; 4];
            le.copy_from_slice(&buf[pos..end]);
            let raw = u32::from_le_bytes(le);
            let value = match spec.field_type {
                FieldType::Sfixed32 => Value::I32(raw as i32),
                FieldType::Float => Value::F32(f32::from_bits(raw)),
                _ => Value::U32(raw),
            };
            (value, end)
        }
        FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Double => {
            let end = advance(buf, pos, 8)?;
            let mut le = [0u8; 8];
            le.copy_from_slice(&buf[pos..end]);
            let raw = u64::from_le_bytes(le);
            let value = match spec.field_type {
                FieldType::Sfixed64 => Value::I64(raw as i64),
                FieldType::Double => Value::F64(f64::from_bits(raw)),
                _ => Value::U64(raw),
            };
            (value, end)
        }
        FieldType::String => {
            let range = length_delimited(buf, pos)?;
            let end = range.end;
            let text = std::str::from_utf8(&buf[range])
                .map_err(|_| DecodeError::InvalidUtf8(spec.number))?;
            (Value::Str(text.to_owned()), end)
        }
        FieldType::Bytes => {
            let range = length_delimited(buf, pos)?;
            let end = range.end;
            (Value::Bytes(Bytes::copy_from_slice(&buf[range])), end)
        }
        FieldType::Message(sub) => {
            let range = length_delimited(buf, pos)?;
            let end = range.end;
            let depth = depth + 1;
            if depth > state.limits.max_depth {
                return Err(DecodeError::DepthLimitExceeded(state.limits.max_depth));
            }
            let mut inner = match record.remove(spec.number) {
                Some(Value::Message(existing)) => existing,
                _ => Record::new(),
            };
            decode_fields(&buf[range], sub, &mut inner, depth, state)?;
            (Value::Message(inner), end)
        }
    };

    record.set(spec.number, value);
    Ok(next)
}

fn varint_value(field_type: &FieldType, raw: u64) -> Value {
    match field_type {
        // int32 keeps the low 32 bits of the sign-extended value
        FieldType::Int32 => Value::I32(raw as i32),
        FieldType::Int64 => Value::I64(raw as i64),
        FieldType::Uint32 => Value::U32(raw as u32),
        FieldType::Sint32 => Value::I32(zigzag_decode_32(raw as u32)),
        FieldType::Sint64 => Value::I64(zigzag_decode_64(raw)),
        FieldType::Bool => Value::Bool(raw != 0),
        _ => Value::U64(raw),
    }
}

/// Every `Required` field, at every nesting level, must be present.
pub(crate) fn check_required(record: &Record, schema: &Schema) -> Result<(), DecodeError> {
    for spec in schema.fields() {
        match (record.get(spec.number), &spec.field_type) {
            (None, _) if spec.presence == Presence::Required => {
                return Err(DecodeError::MissingRequiredField(spec.number));
            }
            (Some(Value::Message(inner)), FieldType::Message(sub)) => {
                check_required(inner, sub)?;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn decode(buf: &[u8], schema: &Schema) -> Result<Record, DecodeError> {
        let mut record = Record::new();
        let mut state = DecodeState::new(LimitsConfig::default());
        decode_fields(buf, schema, &mut record, 0, &mut state)?;
        schema.fill_always(&mut record);
        check_required(&record, schema)?;
        Ok(record)
    }

    #[allow(clippy::unwrap_used)]
    fn scalars() -> Schema {
        Schema::builder("Scalars")
            .field(FieldSpec::optional(1, "i32", FieldType::Int32))
            .field(FieldSpec::optional(2, "s64", FieldType::Sint64))
            .field(FieldSpec::optional(3, "flag", FieldType::Bool))
            .field(FieldSpec::optional(4, "f", FieldType::Float))
            .field(FieldSpec::optional(5, "text", FieldType::String))
            .build()
            .unwrap()
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_negative_int32_ten_bytes() {
        let buf = [
            0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
        ];
        let record = decode(&buf, &scalars()).unwrap();
        assert_eq!(record.get(1), Some(&Value::I32(-1)));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_zigzag_bool_float() {
        let mut buf = vec![0x10, 0x03, 0x18, 0x01, 0x25];
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        let record = decode(&buf, &scalars()).unwrap();
        assert_eq!(record.get(2), Some(&Value::I64(-2)));
        assert_eq!(record.get(3), Some(&Value::Bool(true)));
        assert_eq!(record.get(4), Some(&Value::F32(1.5)));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_last_scalar_wins() {
        let record = decode(&[0x08, 0x01, 0x08, 0x02], &scalars()).unwrap();
        assert_eq!(record.get(1), Some(&Value::I32(2)));
    }

    #[test]
    fn test_wire_type_mismatch() {
        assert_eq!(
            decode(&[0x0A, 0x00], &scalars()),
            Err(DecodeError::WireTypeMismatch {
                field: 1,
                expected: WireType::Varint,
                actual: WireType::LengthDelimited,
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(
            decode(&[0x2A, 0x02, 0xC3, 0x28], &scalars()),
            Err(DecodeError::InvalidUtf8(5))
        );
    }

    #[test]
    fn test_stray_end_group() {
        assert_eq!(
            decode(&[0x0C], &scalars()),
            Err(DecodeError::WireFormatError(
                constants::ERR_END_GROUP_FOR_NON_GROUP.to_string()
            ))
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_nested_messages_merge() {
        let inner = Arc::new(
            Schema::builder("Inner")
                .field(FieldSpec::optional(1, "a", FieldType::Uint32))
                .field(FieldSpec::optional(2, "b", FieldType::Uint32))
                .build()
                .unwrap(),
        );
        let outer = Schema::builder("Outer")
            .field(FieldSpec::optional(1, "m", FieldType::Message(inner)))
            .build()
            .unwrap();

        // m {a: 1} followed by m {b: 2}
        let buf = [0x0A, 0x02, 0x08, 0x01, 0x0A, 0x02, 0x10, 0x02];
        let record = decode(&buf, &outer).unwrap();
        let m = record.get(1).and_then(Value::as_message).unwrap();
        assert_eq!(m.get(1), Some(&Value::U32(1)));
        assert_eq!(m.get(2), Some(&Value::U32(2)));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_missing_required_nested() {
        let inner = Arc::new(
            Schema::builder("Inner")
                .field(FieldSpec::required(1, "id", FieldType::Uint64))
                .build()
                .unwrap(),
        );
        let outer = Schema::builder("Outer")
            .field(FieldSpec::optional(3, "m", FieldType::Message(inner)))
            .build()
            .unwrap();

        assert_eq!(
            decode(&[0x1A, 0x00], &outer),
            Err(DecodeError::MissingRequiredField(1))
        );
        assert!(decode(&[], &outer).is_ok());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_counts_unknown_fields() {
        let mut record = Record::new();
        let mut state = DecodeState::new(LimitsConfig::default());
        decode_fields(&[0x38, 0x01, 0x45, 0, 0, 0, 0], &scalars(), &mut record, 0, &mut state)
            .unwrap();
        assert!(record.is_empty());
        assert_eq!(state.unknown_skipped, 2);
    }
}
