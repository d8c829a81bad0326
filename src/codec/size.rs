//! Size estimation.
//!
//! The encoder writes into a single allocation sized by [`encoded_len`], so the
//! estimate must be exact. Both passes project each field through
//! [`field_to_write`] and [`WireValue`], which keeps them in lockstep.
//!
//! The size pass also records the body length of every nested message in
//! pre-order, so the write pass can emit length prefixes without measuring any
//! subtree a second time.

use crate::core::varint::{size_of_varint, zigzag_encode_32, zigzag_encode_64};
use crate::core::wire::size_of_tag;
use crate::error::EncodeError;
use crate::record::{Record, Value};
use crate::schema::{FieldSpec, FieldType, Presence, Schema};

/// A field value reduced to its physical wire form.
pub(crate) enum WireValue<'a> {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Message(&'a Record, &'a Schema),
}

impl<'a> WireValue<'a> {
    /// Project `value` through the field's declared type.
    pub(crate) fn of(spec: &'a FieldSpec, value: &'a Value) -> Result<Self, EncodeError> {
        let wire = match (&spec.field_type, value) {
            // sign-extend: negative int32 takes the full 10 bytes
            (FieldType::Int32, Value::I32(v)) => WireValue::Varint(i64::from(*v) as u64),
            (FieldType::Int64, Value::I64(v)) => WireValue::Varint(*v as u64),
            (FieldType::Uint32, Value::U32(v)) => WireValue::Varint(u64::from(*v)),
            (FieldType::Uint64, Value::U64(v)) => WireValue::Varint(*v),
            (FieldType::Sint32, Value::I32(v)) => {
                WireValue::Varint(u64::from(zigzag_encode_32(*v)))
            }
            (FieldType::Sint64, Value::I64(v)) => WireValue::Varint(zigzag_encode_64(*v)),
            (FieldType::Bool, Value::Bool(v)) => WireValue::Varint(u64::from(*v)),
            (FieldType::Fixed32, Value::U32(v)) => WireValue::Fixed32(*v),
            (FieldType::Sfixed32, Value::I32(v)) => WireValue::Fixed32(*v as u32),
            (FieldType::Float, Value::F32(v)) => WireValue::Fixed32(v.to_bits()),
            (FieldType::Fixed64, Value::U64(v)) => WireValue::Fixed64(*v),
            (FieldType::Sfixed64, Value::I64(v)) => WireValue::Fixed64(*v as u64),
            (FieldType::Double, Value::F64(v)) => WireValue::Fixed64(v.to_bits()),
            (FieldType::String, Value::Str(s)) => WireValue::Bytes(s.as_bytes()),
            (FieldType::Bytes, Value::Bytes(b)) => WireValue::Bytes(&b[..]),
            (FieldType::Message(schema), Value::Message(r)) => {
                WireValue::Message(r, schema.as_ref())
            }
            (ty, value) => {
                return Err(EncodeError::TypeMismatch {
                    field: spec.number,
                    expected: ty.name(),
                    found: value.kind_name(),
                })
            }
        };
        Ok(wire)
    }

    /// Bytes this value occupies after its tag; nested message lengths are
    /// appended to `nested`
    pub(crate) fn encoded_len(&self, nested: &mut Vec<usize>) -> Result<usize, EncodeError> {
        Ok(match *self {
            WireValue::Varint(v) => size_of_varint(v),
            WireValue::Fixed32(_) => 4,
            WireValue::Fixed64(_) => 8,
            WireValue::Bytes(b) => size_of_varint(b.len() as u64) + b.len(),
            WireValue::Message(record, schema) => {
                let slot = nested.len();
                nested.push(0);
                let inner = measure(record, schema, nested)?;
                nested[slot] = inner;
                size_of_varint(inner as u64) + inner
            }
        })
    }
}

/// Decide what, if anything, gets written for `spec`.
///
/// Present fields yield their value and absent `Optional` fields yield nothing.
/// Absent `Required` and `Always` fields are errors; [`Schema::new_record`]
/// starts a record with every `Always` field at its default.
pub(crate) fn field_to_write<'r>(
    record: &'r Record,
    spec: &FieldSpec,
) -> Result<Option<&'r Value>, EncodeError> {
    match (record.get(spec.number), spec.presence) {
        (Some(value), _) => Ok(Some(value)),
        (None, Presence::Optional) => Ok(None),
        (None, Presence::Always) => Err(EncodeError::MissingAlwaysField(spec.number)),
        (None, Presence::Required) => Err(EncodeError::MissingRequiredField(spec.number)),
    }
}

/// Reject record fields the schema does not declare
pub(crate) fn check_known_fields(record: &Record, schema: &Schema) -> Result<(), EncodeError> {
    match record.iter().find(|(n, _)| schema.field(**n).is_none()) {
        Some((n, _)) => Err(EncodeError::UnknownField(*n)),
        None => Ok(()),
    }
}

/// Exact number of bytes `record` encodes to under `schema`.
pub fn encoded_len(record: &Record, schema: &Schema) -> Result<usize, EncodeError> {
    measure(record, schema, &mut Vec::new())
}

/// [`encoded_len`], collecting nested message body lengths in pre-order
pub(crate) fn measure(
    record: &Record,
    schema: &Schema,
    nested: &mut Vec<usize>,
) -> Result<usize, EncodeError> {
    check_known_fields(record, schema)?;

    let mut n = 0;
    for spec in schema.fields() {
        let Some(value) = field_to_write(record, spec)? else {
            continue;
        };
        n += size_of_tag(spec.number) + WireValue::of(spec, value)?.encoded_len(nested)?;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[allow(clippy::unwrap_used)]
    fn schema() -> Schema {
        Schema::builder("Sizes")
            .field(FieldSpec::optional(1, "a", FieldType::Int32))
            .field(FieldSpec::optional(2, "b", FieldType::Sint32))
            .field(FieldSpec::optional(3, "c", FieldType::Double))
            .field(FieldSpec::optional(20, "d", FieldType::Bytes))
            .build()
            .unwrap()
    }

    #[test]
    fn test_negative_int32_vs_sint32() {
        let schema = schema();
        assert_eq!(encoded_len(&Record::new().with(1, -1i32), &schema), Ok(11));
        assert_eq!(encoded_len(&Record::new().with(2, -1i32), &schema), Ok(2));
    }

    #[test]
    fn test_fixed_and_delimited() {
        let schema = schema();
        assert_eq!(encoded_len(&Record::new().with(3, 1.0f64), &schema), Ok(9));
        // 2-byte tag for field 20, 2-byte length for 200 bytes
        let record = Record::new().with(20, vec![0u8; 200]);
        assert_eq!(encoded_len(&record, &schema), Ok(2 + 2 + 200));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_nested_lengths_recorded_in_preorder() {
        let leaf = Arc::new(
            Schema::builder("Leaf")
                .field(FieldSpec::optional(1, "n", FieldType::Uint32))
                .build()
                .unwrap(),
        );
        let node = Arc::new(
            Schema::builder("Node")
                .field(FieldSpec::optional(1, "left", FieldType::Message(leaf.clone())))
                .field(FieldSpec::optional(2, "right", FieldType::Message(leaf)))
                .build()
                .unwrap(),
        );
        let root = Schema::builder("Root")
            .field(FieldSpec::optional(1, "node", FieldType::Message(node)))
            .build()
            .unwrap();

        let record = Record::new().with(
            1,
            Record::new()
                .with(1, Record::new().with(1, 1u32))
                .with(2, Record::new().with(1, 300u32)),
        );
        let mut nested = Vec::new();
        assert_eq!(measure(&record, &root, &mut nested), Ok(11));
        // node body, then left leaf, then right leaf
        assert_eq!(nested, vec![9, 2, 3]);
    }

    #[test]
    fn test_absent_always_field_rejected() {
        let schema = Schema::builder("A")
            .field(FieldSpec::always(2, "count", FieldType::Int64))
            .build();
        let schema = match schema {
            Ok(schema) => schema,
            Err(e) => panic!("schema: {e}"),
        };
        assert_eq!(
            encoded_len(&Record::new(), &schema),
            Err(EncodeError::MissingAlwaysField(2))
        );
        assert_eq!(encoded_len(&schema.new_record(), &schema), Ok(2));
    }

    #[test]
    fn test_empty_record_is_zero() {
        assert_eq!(encoded_len(&Record::new(), &schema()), Ok(0));
    }

    #[test]
    fn test_errors() {
        let schema = schema();
        assert_eq!(
            encoded_len(&Record::new().with(9, 1i32), &schema),
            Err(EncodeError::UnknownField(9))
        );
        assert_eq!(
            encoded_len(&Record::new().with(3, 1.0f32), &schema),
            Err(EncodeError::TypeMismatch {
                field: 3,
                expected: "double",
                found: "f32"
            })
        );
    }
}
