//! # Varint Codec
//!
//! Base-128 variable-length integers. Each byte carries 7 payload bits, least
//! significant group first; the high bit is set on every byte except the last.
//!
//! ```text
//! 300 = 0b1_0010_1100  ->  [0xAC, 0x02]
//! ```
//!
//! A `u64` needs at most [`MAX_VARINT_LEN`] bytes. Decoding never reads past
//! the end of the input and never accepts an eleventh byte.

use crate::error::DecodeError;
use bytes::BufMut;

/// Longest valid varint: ceil(64 / 7)
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u64 = 0x7F;

/// Write `value` into `buf` starting at `offset`, returning the offset just past
/// the last byte written.
///
/// The buffer must already be sized to hold the varint; see [`size_of_varint`].
#[inline]
pub fn encode_varint(buf: &mut [u8], mut offset: usize, mut value: u64) -> usize {
    while value >= 0x80 {
        buf[offset] = (value & PAYLOAD_MASK) as u8 | CONTINUATION;
        value >>= 7;
        offset += 1;
    }
    buf[offset] = value as u8;
    offset + 1
}

/// Append `value` to a growable buffer.
#[inline]
pub fn put_varint<B: BufMut>(buf: &mut B, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value & PAYLOAD_MASK) as u8 | CONTINUATION);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Read a varint from `buf` at `offset`, returning the value and the offset just
/// past its last byte.
///
/// # Errors
/// - `UnexpectedEndOfInput` if the buffer ends before a terminating byte
/// - `IntegerOverflow` if ten bytes are consumed without termination
#[inline]
pub fn decode_varint(buf: &[u8], offset: usize) -> Result<(u64, usize), DecodeError> {
    let mut value: u64 = 0;
    let mut pos = offset;
    let mut shift: u32 = 0;
    loop {
        if shift >= 64 {
            return Err(DecodeError::IntegerOverflow);
        }
        let byte = *buf.get(pos).ok_or(DecodeError::UnexpectedEndOfInput)?;
        pos += 1;
        value |= (u64::from(byte) & PAYLOAD_MASK) << shift;
        if byte < CONTINUATION {
            return Ok((value, pos));
        }
        shift += 7;
    }
}

/// Advance past a varint without materializing its value.
#[inline]
pub fn skip_varint(buf: &[u8], offset: usize) -> Result<usize, DecodeError> {
    for (i, pos) in (offset..).take(MAX_VARINT_LEN).enumerate() {
        let byte = *buf.get(pos).ok_or(DecodeError::UnexpectedEndOfInput)?;
        if byte < CONTINUATION {
            return Ok(offset + i + 1);
        }
    }
    Err(DecodeError::IntegerOverflow)
}

/// Number of bytes `value` occupies on the wire (minimum 1).
#[inline]
pub const fn size_of_varint(value: u64) -> usize {
    // 64 significant bits -> 10 groups; zero still takes one byte
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Map a signed value onto an unsigned one so small magnitudes stay short.
#[inline]
pub const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[inline]
pub const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}
