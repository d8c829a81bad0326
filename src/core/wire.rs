//! # Wire Types and Tags
//!
//! Every field on the wire starts with a tag: the field number shifted left by
//! three bits, OR'ed with a 3-bit wire type, encoded as a varint.
//!
//! ```text
//! tag = (field_number << 3) | wire_type
//! ```

use crate::core::varint::{decode_varint, encode_varint, size_of_varint};
use crate::error::{constants, DecodeError};
use serde::{Deserialize, Serialize};

/// Largest field number the format can express: 2^29 - 1
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

const WIRE_TYPE_BITS: u32 = 3;
const WIRE_TYPE_MASK: u64 = 0x7;

/// Physical encoding of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint
    Varint = 0,
    /// 8 little-endian bytes
    Fixed64 = 1,
    /// Varint length followed by that many bytes
    LengthDelimited = 2,
    /// Opens a group; fields follow until the matching `EndGroup`
    StartGroup = 3,
    /// Closes a group
    EndGroup = 4,
    /// 4 little-endian bytes
    Fixed32 = 5,
}

impl WireType {
    /// Map the low three bits of a tag onto a wire type
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// A field number paired with the wire type of the value that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub field_number: u32,
    pub wire_type: WireType,
}

impl Tag {
    pub const fn new(field_number: u32, wire_type: WireType) -> Self {
        Self {
            field_number,
            wire_type,
        }
    }

    /// Packed integer form of the tag
    #[inline]
    pub const fn encode(self) -> u64 {
        ((self.field_number as u64) << WIRE_TYPE_BITS) | self.wire_type as u64
    }

    /// Split a packed tag into its parts.
    ///
    /// Rejects unknown wire types and field numbers outside `1..=MAX_FIELD_NUMBER`.
    /// An `EndGroup` tag is accepted here; whether it is legal depends on where it
    /// appears and is left to the caller.
    pub fn decode(value: u64) -> Result<Self, DecodeError> {
        let bits = (value & WIRE_TYPE_MASK) as u8;
        let wire_type = WireType::from_bits(bits).ok_or_else(|| {
            DecodeError::WireFormatError(format!("illegal wire type {bits}"))
        })?;

        let field_number = value >> WIRE_TYPE_BITS;
        if field_number == 0 {
            return Err(DecodeError::WireFormatError(
                constants::ERR_ILLEGAL_FIELD_NUMBER.to_string(),
            ));
        }
        if field_number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::WireFormatError(format!(
                "{}: {field_number}",
                constants::ERR_FIELD_NUMBER_TOO_LARGE
            )));
        }

        Ok(Self {
            field_number: field_number as u32,
            wire_type,
        })
    }

    /// Encoded size of this tag in bytes
    #[inline]
    pub const fn encoded_len(self) -> usize {
        size_of_varint(self.encode())
    }
}

/// Write a tag into a pre-sized buffer; returns the offset after it.
#[inline]
pub fn encode_tag(buf: &mut [u8], offset: usize, tag: Tag) -> usize {
    encode_varint(buf, offset, tag.encode())
}

/// Read and validate a tag at `offset`; returns it with the offset after it.
#[inline]
pub fn decode_tag(buf: &[u8], offset: usize) -> Result<(Tag, usize), DecodeError> {
    let (raw, next) = decode_varint(buf, offset)?;
    Ok((Tag::decode(raw)?, next))
}

/// Encoded size of the tag for `field_number`; independent of wire type.
#[inline]
pub const fn size_of_tag(field_number: u32) -> usize {
    size_of_varint((field_number as u64) << WIRE_TYPE_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_packing() {
        assert_eq!(Tag::new(1, WireType::LengthDelimited).encode(), 0x0A);
        assert_eq!(Tag::new(2, WireType::Varint).encode(), 0x10);
        assert_eq!(Tag::new(3, WireType::Varint).encode(), 0x18);
        assert_eq!(Tag::new(16, WireType::Fixed32).encode(), 0x85);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_tag_unpacking() {
        let tag = Tag::decode(0x0A).unwrap();
        assert_eq!(tag, Tag::new(1, WireType::LengthDelimited));

        let big = Tag::new(MAX_FIELD_NUMBER, WireType::StartGroup);
        assert_eq!(Tag::decode(big.encode()).unwrap(), big);
    }

    #[test]
    fn test_tag_rejects_field_zero() {
        assert!(matches!(
            Tag::decode(0x02),
            Err(DecodeError::WireFormatError(_))
        ));
    }

    #[test]
    fn test_tag_rejects_illegal_wire_types() {
        for bits in [6u64, 7] {
            let err = Tag::decode((1 << 3) | bits);
            assert_eq!(
                err,
                Err(DecodeError::WireFormatError(format!("illegal wire type {bits}")))
            );
        }
    }

    #[test]
    fn test_tag_rejects_oversized_field_number() {
        let raw = (u64::from(MAX_FIELD_NUMBER) + 1) << 3;
        assert!(matches!(
            Tag::decode(raw),
            Err(DecodeError::WireFormatError(_))
        ));
    }

    #[test]
    fn test_size_of_tag() {
        assert_eq!(size_of_tag(1), 1);
        assert_eq!(size_of_tag(15), 1);
        assert_eq!(size_of_tag(16), 2);
        assert_eq!(size_of_tag(2047), 2);
        assert_eq!(size_of_tag(2048), 3);
        assert_eq!(size_of_tag(MAX_FIELD_NUMBER), 5);
    }

    #[test]
    fn test_encode_decode_tag_in_buffer() {
        let tag = Tag::new(300, WireType::Fixed64);
        let mut buf = vec![0u8; tag.encoded_len() + 1];
        let end = encode_tag(&mut buf, 1, tag);
        assert_eq!(end, buf.len());
        assert_eq!(decode_tag(&buf, 1), Ok((tag, end)));
    }
}
