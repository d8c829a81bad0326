//! # Wire Primitives
//!
//! Schema-free building blocks: varints, tags, and field skipping.
//!
//! ## Components
//! - **Varint**: LEB128 integers and zigzag mapping
//! - **Wire**: Wire types and `(field_number << 3) | wire_type` tags
//! - **Skip**: Walk past one field of any wire type, groups included
//!
//! ## Wire Format
//! ```text
//! Varint:           [Tag] [1-10 bytes, 7 bits each, low group first]
//! Fixed64/Fixed32:  [Tag] [8 or 4 bytes little-endian]
//! LengthDelimited:  [Tag] [Length varint] [Length bytes]
//! Group:            [Tag(StartGroup)] [fields...] [Tag(EndGroup)]
//! ```
//!
//! ## Security
//! - Varints longer than 10 bytes are rejected
//! - Lengths are checked against the remaining input before any slicing
//! - Group nesting is bounded

pub mod skip;
pub mod varint;
pub mod wire;
