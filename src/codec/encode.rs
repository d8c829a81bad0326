//! Field encoder.
//!
//! Writes `(tag, value)` pairs in ascending field-number order into a buffer
//! that has already been sized by the size pass. The size is checked once up
//! front; the write pass itself does no growth and no re-checking, and takes
//! nested message lengths from the size pass instead of re-measuring.

use super::size::{field_to_write, measure, WireValue};
use crate::core::varint::encode_varint;
use crate::core::wire::{encode_tag, Tag};
use crate::error::EncodeError;
use crate::record::Record;
use crate::schema::Schema;
use bytes::BytesMut;
use std::slice;
use tracing::warn;

/// Encode into a freshly allocated, exactly-sized buffer.
pub fn encode(record: &Record, schema: &Schema) -> Result<Vec<u8>, EncodeError> {
    let mut nested = Vec::new();
    let size = measure(record, schema, &mut nested)?;
    let mut buf = vec![0u8; size];
    write_sized(record, schema, &mut buf, 0, size, &nested)?;
    Ok(buf)
}

/// Encode into `buf` starting at `offset`, returning the offset after the last
/// byte written.
///
/// # Errors
/// Schema violations, or `BufferTooSmall` if fewer than
/// [`encoded_len`](super::encoded_len) bytes remain after `offset`.
pub fn encode_to(
    record: &Record,
    schema: &Schema,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize, EncodeError> {
    let mut nested = Vec::new();
    let size = measure(record, schema, &mut nested)?;
    write_sized(record, schema, buf, offset, size, &nested)
}

/// Append the encoding to a growable buffer, returning the number of bytes added.
///
/// On error `dst` is left as it was.
pub fn encode_into(
    record: &Record,
    schema: &Schema,
    dst: &mut BytesMut,
) -> Result<usize, EncodeError> {
    let mut nested = Vec::new();
    let size = measure(record, schema, &mut nested)?;
    let start = dst.len();
    dst.resize(start + size, 0);
    if let Err(e) = write_sized(record, schema, &mut dst[..], start, size, &nested) {
        dst.truncate(start);
        return Err(e);
    }
    Ok(size)
}

fn write_sized(
    record: &Record,
    schema: &Schema,
    buf: &mut [u8],
    offset: usize,
    size: usize,
    nested: &[usize],
) -> Result<usize, EncodeError> {
    let available = buf.len().saturating_sub(offset);
    if size > available {
        return Err(EncodeError::BufferTooSmall {
            needed: size,
            available,
        });
    }

    let end = write_record(record, schema, buf, offset, &mut nested.iter())?;
    let written = end - offset;
    if written != size {
        warn!(
            schema = schema.name(),
            expected = size,
            written,
            "Encoded length disagrees with size estimate"
        );
        return Err(EncodeError::SizeMismatch {
            expected: size,
            written,
        });
    }
    Ok(end)
}

fn write_record(
    record: &Record,
    schema: &Schema,
    buf: &mut [u8],
    mut offset: usize,
    nested: &mut slice::Iter<'_, usize>,
) -> Result<usize, EncodeError> {
    for spec in schema.fields() {
        let Some(value) = field_to_write(record, spec)? else {
            continue;
        };
        let wire = WireValue::of(spec, value)?;
        offset = encode_tag(buf, offset, Tag::new(spec.number, spec.wire_type()));
        offset = write_value(buf, offset, &wire, nested)?;
    }
    Ok(offset)
}

fn write_value(
    buf: &mut [u8],
    offset: usize,
    wire: &WireValue<'_>,
    nested: &mut slice::Iter<'_, usize>,
) -> Result<usize, EncodeError> {
    Ok(match *wire {
        WireValue::Varint(v) => encode_varint(buf, offset, v),
        WireValue::Fixed32(v) => put_slice(buf, offset, &v.to_le_bytes()),
        WireValue::Fixed64(v) => put_slice(buf, offset, &v.to_le_bytes()),
        WireValue::Bytes(bytes) => {
            let offset = encode_varint(buf, offset, bytes.len() as u64);
            put_slice(buf, offset, bytes)
        }
        WireValue::Message(record, schema) => {
            let len = match nested.next() {
                Some(&len) => len,
                None => measure(record, schema, &mut Vec::new())?,
            };
            let offset = encode_varint(buf, offset, len as u64);
            write_record(record, schema, buf, offset, nested)?
        }
    })
}

#[inline]
fn put_slice(buf: &mut [u8], offset: usize, bytes: &[u8]) -> usize {
    let end = offset + bytes.len();
    buf[offset..end].copy_from_slice(bytes);
    end
}
