//! # Schemas
//!
//! A [`Schema`] tells the codec, for each field number, what the field is
//! called, which semantic type it carries, how that type goes on the wire, and
//! what to do when the field is absent.
//!
//! ```rust
//! use tagwire::schema::{FieldSpec, FieldType, Schema};
//! use tagwire::record::Value;
//!
//! let schema = Schema::builder("B")
//!     .field(FieldSpec::optional(1, "String", FieldType::String))
//!     .field(FieldSpec::always(2, "Int64", FieldType::Int64))
//!     .field(FieldSpec::optional(3, "Int32", FieldType::Int32).with_default(1234i32))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.field_by_name("Int32").map(|f| f.number), Some(3));
//! ```

use crate::core::wire::{WireType, MAX_FIELD_NUMBER};
use crate::error::{constants, CodecError, Result};
use crate::record::{Record, Value};
use crate::text::TextDisplay;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Semantic type of a field. Each maps to exactly one wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Varint, two's complement; negatives take 10 bytes
    Int32,
    Int64,
    Uint32,
    Uint64,
    /// Varint, zigzag
    Sint32,
    Sint64,
    Bool,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    /// Length-delimited UTF-8
    String,
    Bytes,
    /// Length-delimited nested record
    Message(Arc<Schema>),
}

impl FieldType {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool => WireType::Varint,
            FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Double => WireType::Fixed64,
            FieldType::Fixed32 | FieldType::Sfixed32 | FieldType::Float => WireType::Fixed32,
            FieldType::String | FieldType::Bytes | FieldType::Message(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// Whether signed values are zigzag-mapped before varint encoding
    pub fn is_zigzag(&self) -> bool {
        matches!(self, FieldType::Sint32 | FieldType::Sint64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Uint32 => "uint32",
            FieldType::Uint64 => "uint64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
            FieldType::Bool => "bool",
            FieldType::Fixed32 => "fixed32",
            FieldType::Fixed64 => "fixed64",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Message(_) => "message",
        }
    }

    /// Whether `value` is the in-memory representation of this type
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (
                FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32,
                Value::I32(_)
            ) | (
                FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64,
                Value::I64(_)
            ) | (FieldType::Uint32 | FieldType::Fixed32, Value::U32(_))
                | (FieldType::Uint64 | FieldType::Fixed64, Value::U64(_))
                | (FieldType::Bool, Value::Bool(_))
                | (FieldType::Float, Value::F32(_))
                | (FieldType::Double, Value::F64(_))
                | (FieldType::String, Value::Str(_))
                | (FieldType::Bytes, Value::Bytes(_))
                | (FieldType::Message(_), Value::Message(_))
        )
    }

    /// Value reported for an absent field with no declared default
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => Value::I32(0),
            FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => Value::I64(0),
            FieldType::Uint32 | FieldType::Fixed32 => Value::U32(0),
            FieldType::Uint64 | FieldType::Fixed64 => Value::U64(0),
            FieldType::Bool => Value::Bool(false),
            FieldType::Float => Value::F32(0.0),
            FieldType::Double => Value::F64(0.0),
            FieldType::String => Value::Str(String::new()),
            FieldType::Bytes => Value::Bytes(Bytes::new()),
            FieldType::Message(_) => Value::Message(Record::new()),
        }
    }
}

/// What the codec does with an absent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent fields are not written
    Optional,
    /// Absent fields fail encoding, and fail decoding if still absent at the end
    Required,
    /// Always written, so a record must hold it when encoded; decoding fills it
    /// with its default when the input omits it
    Always,
}

/// One field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub number: u32,
    pub name: String,
    pub field_type: FieldType,
    pub presence: Presence,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(
        number: u32,
        name: impl Into<String>,
        field_type: FieldType,
        presence: Presence,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            field_type,
            presence,
            default: None,
        }
    }

    pub fn optional(number: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(number, name, field_type, Presence::Optional)
    }

    pub fn required(number: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(number, name, field_type, Presence::Required)
    }

    pub fn always(number: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(number, name, field_type, Presence::Always)
    }

    /// Declare the value reported when absent, and the initial value of an
    /// `Always` field in [`Schema::new_record`]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declared default, falling back to the type's zero value
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.field_type.zero_value())
    }

    pub fn wire_type(&self) -> WireType {
        self.field_type.wire_type()
    }
}

/// An immutable, validated field table.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: BTreeMap<u32, FieldSpec>,
    by_name: HashMap<String, u32>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, number: u32) -> Option<&FieldSpec> {
        self.fields.get(&number)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name).and_then(|n| self.fields.get(n))
    }

    /// Fields in ascending field-number order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The stored value of a field, or its default when absent.
    ///
    /// Returns `None` only when `number` is not part of this schema.
    pub fn value_or_default<'r>(&self, record: &'r Record, number: u32) -> Option<Cow<'r, Value>> {
        let spec = self.field(number)?;
        Some(match record.get(number) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(spec.default_value()),
        })
    }

    /// A record holding every `Always` field at its default, nested messages
    /// included. Encodes as-is; other fields can be set on top.
    pub fn new_record(&self) -> Record {
        let mut record = Record::new();
        self.fill_always(&mut record);
        record
    }

    /// Set every absent `Always` field to its default, recursing into present
    /// nested messages.
    pub(crate) fn fill_always(&self, record: &mut Record) {
        for spec in self.fields() {
            if spec.presence == Presence::Always && !record.contains(spec.number) {
                record.set(spec.number, spec.default_value());
            }
            if let (Some(Value::Message(inner)), FieldType::Message(sub)) =
                (record.get_mut(spec.number), &spec.field_type)
            {
                sub.fill_always(inner);
            }
        }
    }

    /// Compact one-line text rendering of `record` using this schema's names
    pub fn display<'a>(&'a self, record: &'a Record) -> TextDisplay<'a> {
        TextDisplay::new(record, self)
    }
}

/// Collects fields and validates them into a [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Validate and freeze the field table.
    ///
    /// # Errors
    /// Returns `CodecError::SchemaError` on an out-of-range or duplicate field
    /// number, an empty or duplicate name, or a default that does not match its
    /// field type.
    pub fn build(self) -> Result<Schema> {
        let mut fields = BTreeMap::new();
        let mut by_name = HashMap::new();

        for spec in self.fields {
            if spec.number == 0 || spec.number > MAX_FIELD_NUMBER {
                return Err(CodecError::SchemaError(format!(
                    "{}: field number {} outside 1..={MAX_FIELD_NUMBER}",
                    self.name, spec.number
                )));
            }
            if spec.name.is_empty() {
                return Err(CodecError::SchemaError(format!(
                    "{}: {} (field {})",
                    self.name,
                    constants::ERR_EMPTY_FIELD_NAME,
                    spec.number
                )));
            }
            if let Some(default) = &spec.default {
                if matches!(spec.field_type, FieldType::Message(_)) {
                    return Err(CodecError::SchemaError(format!(
                        "{}: {} ({})",
                        self.name,
                        constants::ERR_MESSAGE_DEFAULT,
                        spec.name
                    )));
                }
                if !spec.field_type.accepts(default) {
                    return Err(CodecError::SchemaError(format!(
                        "{}: {} ({}: {} given {})",
                        self.name,
                        constants::ERR_DEFAULT_TYPE_MISMATCH,
                        spec.name,
                        spec.field_type.name(),
                        default.kind_name()
                    )));
                }
            }
            if by_name.insert(spec.name.clone(), spec.number).is_some() {
                return Err(CodecError::SchemaError(format!(
                    "{}: {} '{}'",
                    self.name,
                    constants::ERR_DUPLICATE_FIELD_NAME,
                    spec.name
                )));
            }
            let number = spec.number;
            if fields.insert(number, spec).is_some() {
                return Err(CodecError::SchemaError(format!(
                    "{}: {} {number}",
                    self.name,
                    constants::ERR_DUPLICATE_FIELD_NUMBER
                )));
            }
        }

        Ok(Schema {
            name: self.name,
            fields,
            by_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::unwrap_used)]
    fn sample() -> Schema {
        Schema::builder("B")
            .field(FieldSpec::optional(1, "String", FieldType::String))
            .field(FieldSpec::always(2, "Int64", FieldType::Int64))
            .field(FieldSpec::optional(3, "Int32", FieldType::Int32).with_default(1234i32))
            .build()
            .unwrap()
    }

    #[test]
    fn test_wire_types() {
        assert_eq!(FieldType::Sint64.wire_type(), WireType::Varint);
        assert_eq!(FieldType::Double.wire_type(), WireType::Fixed64);
        assert_eq!(FieldType::Float.wire_type(), WireType::Fixed32);
        assert_eq!(FieldType::Bytes.wire_type(), WireType::LengthDelimited);
        assert!(FieldType::Sint32.is_zigzag());
        assert!(!FieldType::Int32.is_zigzag());
    }

    #[test]
    fn test_lookup_and_order() {
        let schema = sample();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.field(2).map(|f| f.name.as_str()), Some("Int64"));
        assert_eq!(schema.field_by_name("String").map(|f| f.number), Some(1));
        assert!(schema.field(4).is_none());

        let numbers: Vec<u32> = schema.fields().map(|f| f.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_value_or_default() {
        let schema = sample();
        let record = Record::new().with(2, 5i64);

        assert_eq!(
            schema.value_or_default(&record, 2).as_deref(),
            Some(&Value::I64(5))
        );
        assert_eq!(
            schema.value_or_default(&record, 3).as_deref(),
            Some(&Value::I32(1234))
        );
        assert_eq!(
            schema.value_or_default(&record, 1).as_deref(),
            Some(&Value::Str(String::new()))
        );
        assert!(schema.value_or_default(&record, 9).is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_new_record_fills_always_fields() {
        let inner = Arc::new(
            Schema::builder("Inner")
                .field(FieldSpec::always(1, "flag", FieldType::Bool).with_default(true))
                .field(FieldSpec::optional(2, "note", FieldType::String))
                .build()
                .unwrap(),
        );
        let schema = Schema::builder("Outer")
            .field(FieldSpec::always(1, "count", FieldType::Uint32).with_default(3u32))
            .field(FieldSpec::optional(2, "name", FieldType::String))
            .field(FieldSpec::always(3, "inner", FieldType::Message(inner)))
            .build()
            .unwrap();

        let record = schema.new_record();
        assert_eq!(
            record,
            Record::new()
                .with(1, 3u32)
                .with(3, Record::new().with(1, true))
        );
    }

    #[test]
    fn test_rejects_bad_field_numbers() {
        for number in [0, MAX_FIELD_NUMBER + 1] {
            let result = Schema::builder("Bad")
                .field(FieldSpec::optional(number, "x", FieldType::Bool))
                .build();
            assert!(matches!(result, Err(CodecError::SchemaError(_))));
        }
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_number = Schema::builder("Dup")
            .field(FieldSpec::optional(1, "a", FieldType::Bool))
            .field(FieldSpec::optional(1, "b", FieldType::Bool))
            .build();
        assert!(matches!(dup_number, Err(CodecError::SchemaError(msg)) if msg.contains("duplicate field number")));

        let dup_name = Schema::builder("Dup")
            .field(FieldSpec::optional(1, "a", FieldType::Bool))
            .field(FieldSpec::optional(2, "a", FieldType::Bool))
            .build();
        assert!(matches!(dup_name, Err(CodecError::SchemaError(msg)) if msg.contains("duplicate field name")));
    }

    #[test]
    fn test_rejects_mismatched_default() {
        let result = Schema::builder("Bad")
            .field(FieldSpec::optional(1, "n", FieldType::Sint32).with_default(7i64))
            .build();
        assert!(matches!(result, Err(CodecError::SchemaError(_))));
    }
}
