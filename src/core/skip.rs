//! # Unknown-Field Skipping
//!
//! Consumes a field's value without materializing it, so a reader can step over
//! fields its schema does not know about. Groups are skipped up to their
//! matching `EndGroup` tag with an explicit nesting counter, bounded by a
//! caller-supplied depth limit.
//!
//! Every byte access is bounds-checked; running out of input is reported as
//! [`DecodeError::UnexpectedEndOfInput`], never as a panic.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::core::varint::{decode_varint, skip_varint};
use crate::core::wire::{decode_tag, WireType};
use crate::error::DecodeError;
use std::ops::Range;

/// Skip one complete field (tag and value) starting at `offset`.
///
/// Returns the offset of the first byte after the field. An `EndGroup` tag is
/// its own complete field: the returned offset is just past the tag, which hands
/// the terminator back to whichever group skip is in progress.
pub fn skip_field(buf: &[u8], offset: usize) -> Result<usize, DecodeError> {
    skip_field_bounded(buf, offset, 0, DEFAULT_MAX_DEPTH)
}

/// [`skip_field`] starting at nesting `depth`, failing once groups nest deeper
/// than `max_depth`.
pub fn skip_field_bounded(
    buf: &[u8],
    offset: usize,
    depth: usize,
    max_depth: usize,
) -> Result<usize, DecodeError> {
    let (tag, next) = decode_tag(buf, offset)?;
    skip_value(buf, next, tag.wire_type, depth, max_depth)
}

/// Skip a value whose tag has already been read; `offset` points just past it.
pub fn skip_value(
    buf: &[u8],
    offset: usize,
    wire_type: WireType,
    depth: usize,
    max_depth: usize,
) -> Result<usize, DecodeError> {
    match wire_type {
        WireType::StartGroup => skip_group(buf, offset, depth, max_depth),
        WireType::EndGroup => Ok(offset),
        flat => skip_flat(buf, offset, flat),
    }
}

/// Skip a group body up to and including its `EndGroup` tag.
///
/// Nested groups are tracked with a counter rather than the call stack, so the
/// only bound on nesting is `max_depth`.
fn skip_group(
    buf: &[u8],
    offset: usize,
    depth: usize,
    max_depth: usize,
) -> Result<usize, DecodeError> {
    let mut open = 0usize;
    let mut wire_type = WireType::StartGroup;
    let mut pos = offset;
    loop {
        match wire_type {
            WireType::StartGroup => {
                open += 1;
                if depth + open > max_depth {
                    return Err(DecodeError::DepthLimitExceeded(max_depth));
                }
            }
            WireType::EndGroup => {
                open -= 1;
                if open == 0 {
                    return Ok(pos);
                }
            }
            flat => pos = skip_flat(buf, pos, flat)?,
        }
        let (tag, next) = decode_tag(buf, pos)?;
        wire_type = tag.wire_type;
        pos = next;
    }
}

/// Skip a varint, fixed-width, or length-delimited value
fn skip_flat(buf: &[u8], offset: usize, wire_type: WireType) -> Result<usize, DecodeError> {
    match wire_type {
        WireType::Varint => skip_varint(buf, offset),
        WireType::Fixed64 => advance(buf, offset, 8),
        WireType::Fixed32 => advance(buf, offset, 4),
        WireType::LengthDelimited => Ok(length_delimited(buf, offset)?.end),
        WireType::StartGroup | WireType::EndGroup => Ok(offset),
    }
}

/// Read a length prefix at `offset` and return the byte range of the payload.
///
/// # Errors
/// - `InvalidLength` if the length cannot be represented as a buffer index
/// - `UnexpectedEndOfInput` if the payload runs past the end of `buf`
pub fn length_delimited(buf: &[u8], offset: usize) -> Result<Range<usize>, DecodeError> {
    let (len, start) = decode_varint(buf, offset)?;
    if len > isize::MAX as u64 {
        return Err(DecodeError::InvalidLength(len));
    }
    let end = start
        .checked_add(len as usize)
        .ok_or(DecodeError::InvalidLength(len))?;
    if end > buf.len() {
        return Err(DecodeError::UnexpectedEndOfInput);
    }
    Ok(start..end)
}

/// Advance `offset` by `width` bytes, checking the buffer holds them.
#[inline]
pub(crate) fn advance(buf: &[u8], offset: usize, width: usize) -> Result<usize, DecodeError> {
    match offset.checked_add(width) {
        Some(end) if end <= buf.len() => Ok(end),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}
