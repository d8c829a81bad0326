//! Compact text rendering of records, for logs and debugging.
//!
//! Fields render as `Name:value` separated by single spaces, in field-number
//! order. Strings and bytes are quoted and escaped; nested records render as
//! `Name:<...>`. Fields the schema does not know render under their number.

use crate::record::{Record, Value};
use crate::schema::{FieldType, Presence, Schema};
use std::borrow::Cow;
use std::fmt;

/// `Display` adapter pairing a record with the schema that names its fields.
pub struct TextDisplay<'a> {
    record: &'a Record,
    schema: &'a Schema,
}

impl<'a> TextDisplay<'a> {
    pub fn new(record: &'a Record, schema: &'a Schema) -> Self {
        Self { record, schema }
    }
}

impl fmt::Display for TextDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_str(" ")
            }
        };

        for spec in self.schema.fields() {
            let value = match self.record.get(spec.number) {
                Some(value) => Cow::Borrowed(value),
                None if spec.presence == Presence::Always => Cow::Owned(spec.default_value()),
                None => continue,
            };
            sep(f)?;
            write!(f, "{}:", spec.name)?;
            write_value(f, &value, Some(&spec.field_type))?;
        }

        for (number, value) in self.record {
            if self.schema.field(*number).is_none() {
                sep(f)?;
                write!(f, "{number}:")?;
                write_value(f, value, None)?;
            }
        }
        Ok(())
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, ty: Option<&FieldType>) -> fmt::Result {
    match value {
        Value::I32(v) => write!(f, "{v}"),
        Value::I64(v) => write!(f, "{v}"),
        Value::U32(v) => write!(f, "{v}"),
        Value::U64(v) => write!(f, "{v}"),
        Value::Bool(v) => write!(f, "{v}"),
        Value::F32(v) => write!(f, "{v}"),
        Value::F64(v) => write!(f, "{v}"),
        Value::Str(s) => write!(f, "\"{}\"", s.escape_default()),
        Value::Bytes(b) => write!(f, "\"{}\"", b.escape_ascii()),
        Value::Message(inner) => match ty {
            Some(FieldType::Message(schema)) => write!(f, "<{}>", TextDisplay::new(inner, schema)),
            _ => write!(f, "<{} fields>", inner.len()),
        },
    }
}

/// Render `record` as a single line of `Name:value` pairs
pub fn compact_text(record: &Record, schema: &Schema) -> String {
    TextDisplay::new(record, schema).to_string()
}
