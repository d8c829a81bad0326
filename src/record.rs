//! # Records and Values
//!
//! A [`Record`] holds the fields that are present, keyed by field number.
//! Absence is represented by the key being missing, so "not set" and "set to
//! zero" stay distinct. Iteration is always in ascending field-number order.

use bytes::Bytes;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A typed field value.
///
/// The variant is the in-memory representation; the schema's field type decides
/// how it is written (for example `I32` can be an `int32`, `sint32`, or
/// `sfixed32` on the wire).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Bool(bool),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Bytes),
    Message(Record),
}

impl Value {
    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Bool(_) => "bool",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Message(_) => "message",
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(&b[..]),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Record> {
        match self {
            Value::Message(r) => Some(r),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Message(v)
    }
}

/// The present fields of one structured record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<u32, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Record::set)
    #[must_use]
    pub fn with(mut self, field_number: u32, value: impl Into<Value>) -> Self {
        self.fields.insert(field_number, value.into());
        self
    }

    /// Mark a field present with `value`, returning the previous value if any
    pub fn set(&mut self, field_number: u32, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field_number, value.into())
    }

    pub fn get(&self, field_number: u32) -> Option<&Value> {
        self.fields.get(&field_number)
    }

    pub fn get_mut(&mut self, field_number: u32) -> Option<&mut Value> {
        self.fields.get_mut(&field_number)
    }

    /// Mark a field absent, returning its value if it was present
    pub fn remove(&mut self, field_number: u32) -> Option<Value> {
        self.fields.remove(&field_number)
    }

    pub fn contains(&self, field_number: u32) -> bool {
        self.fields.contains_key(&field_number)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Present fields in ascending field-number order
    pub fn iter(&self) -> btree_map::Iter<'_, u32, Value> {
        self.fields.iter()
    }

    /// Clear every field back to absent
    pub fn reset(&mut self) {
        self.fields.clear();
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a u32, &'a Value);
    type IntoIter = btree_map::Iter<'a, u32, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<(u32, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (u32, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
