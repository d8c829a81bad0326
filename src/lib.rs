//! # tagwire
//!
//! A schema-driven codec for the protobuf tag/varint wire format.
//!
//! Records are sparse maps from field number to typed [`Value`]. A [`Schema`]
//! says, for each field number, what type it carries and whether it must be
//! present. The codec turns a record into exactly-sized bytes and back, and
//! skips fields it does not know so older readers accept newer writers.
//!
//! ## Layout
//! - [`core`]: varints, tags, and skipping, with no schema involved
//! - [`schema`] and [`record`]: the data model
//! - [`codec`]: size, encode, and decode of whole records
//! - [`text`]: one-line text rendering for logs
//! - [`config`] and [`utils`]: limits, logging, metrics
//!
//! ## Example
//! ```rust
//! use tagwire::{decode, encode, FieldSpec, FieldType, Record, Schema};
//!
//! let schema = Schema::builder("Point")
//!     .field(FieldSpec::required(1, "x", FieldType::Sint32))
//!     .field(FieldSpec::required(2, "y", FieldType::Sint32))
//!     .build()?;
//!
//! let point = Record::new().with(1, -3i32).with(2, 4i32);
//! let bytes = encode(&point, &schema)?;
//! assert_eq!(bytes, [0x08, 0x05, 0x10, 0x08]);
//! assert_eq!(decode(&bytes, &schema)?, point);
//! # Ok::<(), tagwire::CodecError>(())
//! ```

pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod record;
pub mod schema;
pub mod text;
pub mod utils;

pub use codec::{decode, encode, encode_to, encoded_len, size, Codec};
pub use config::{CodecConfig, LimitsConfig, LoggingConfig};
pub use error::{CodecError, DecodeError, EncodeError, Result};
pub use record::{Record, Value};
pub use schema::{FieldSpec, FieldType, Presence, Schema, SchemaBuilder};
pub use text::compact_text;
