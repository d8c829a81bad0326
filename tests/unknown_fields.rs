//! Forward compatibility: readers with older schemas skip newer fields.

#![allow(clippy::unwrap_used)]

use tagwire::{decode, encode, FieldSpec, FieldType, Record, Schema, Value};

fn writer_schema() -> Schema {
    Schema::builder("V2")
        .field(FieldSpec::optional(1, "name", FieldType::String))
        .field(FieldSpec::optional(2, "count", FieldType::Int64))
        .field(FieldSpec::optional(3, "extra", FieldType::Int64))
        .build()
        .unwrap()
}

fn reader_schema() -> Schema {
    Schema::builder("V1")
        .field(FieldSpec::optional(1, "name", FieldType::String))
        .field(FieldSpec::optional(2, "count", FieldType::Int64))
        .build()
        .unwrap()
}

#[test]
fn test_old_reader_drops_new_field() {
    let record = Record::new().with(1, "hello").with(2, 42i64).with(3, 7i64);
    let bytes = encode(&record, &writer_schema()).unwrap();

    let decoded = decode(&bytes, &reader_schema()).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.get(1), Some(&Value::Str("hello".into())));
    assert_eq!(decoded.get(2), Some(&Value::I64(42)));
    assert!(!decoded.contains(3));
}

#[test]
fn test_unknown_fields_of_every_wire_type() {
    let mut bytes = vec![
        0x38, 0x96, 0x01, // 7: varint 150
        0x41, 1, 2, 3, 4, 5, 6, 7, 8, // 8: fixed64
        0x4A, 0x03, b'a', b'b', b'c', // 9: length-delimited
        0x55, 9, 9, 9, 9, // 10: fixed32
        0x5B, 0x08, 0x01, 0x63, 0x64, 0x5C, // 11: group holding a nested group 12
    ];
    bytes.extend_from_slice(&[0x10, 0x2A]);

    let decoded = decode(&bytes, &reader_schema()).unwrap();
    assert_eq!(decoded, Record::new().with(2, 42i64));
}

#[test]
fn test_unknown_fields_interleaved_with_known() {
    let bytes = [
        0xF8, 0x01, 0x01, // 31: varint
        0x0A, 0x01, b'x', // 1: "x"
        0xC2, 0x3E, 0x00, // 1000: empty bytes
        0x10, 0x02, // 2: 2
    ];
    let decoded = decode(&bytes, &reader_schema()).unwrap();
    assert_eq!(decoded, Record::new().with(1, "x").with(2, 2i64));
}

#[test]
fn test_reencode_after_skip_drops_unknowns() {
    let record = Record::new().with(1, "hello").with(2, 42i64).with(3, 7i64);
    let bytes = encode(&record, &writer_schema()).unwrap();
    let decoded = decode(&bytes, &reader_schema()).unwrap();

    let reencoded = encode(&decoded, &reader_schema()).unwrap();
    assert_eq!(reencoded, &bytes[..bytes.len() - 2]);
}
