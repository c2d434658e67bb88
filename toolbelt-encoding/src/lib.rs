//! # toolbelt-encoding: flat binary codec with caller-chosen byte order
//!
//! Values are written field by field into a byte stream that carries no type
//! information.  Both sides must agree on the value's shape.
//!
//! ## Wire layout
//!
//! ```text
//! struct      → fields in declaration order, no padding
//! [T; N]      → N element encodings, no prefix
//! Vec<T>/[T]  → i64 element count ║ element encodings
//! String/str  → i64 byte count    ║ UTF-8 bytes
//! scalar      → fixed width, ByteOrder::{LittleEndian, BigEndian}
//! bool        → 1 byte (decode: non-zero is true)
//! ```
//!
//! Structs opt in with `#[derive(Marshal, Unmarshal)]`.
//!
//! ## Modules
//!
//! - [`codec`]: the [`Marshal`] / [`Unmarshal`] traits and their impls
//! - [`stream`]: entry points over byte buffers, readers and seekable readers

extern crate self as toolbelt_encoding;

pub mod codec;
pub mod stream;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codec::{Marshal, Unmarshal};
pub use stream::{marshal, marshal_to, unmarshal, unmarshal_init_slice, unpack};
pub use toolbelt_encoding_macros::{Marshal, Unmarshal};

/// Byte order of every multi-byte scalar in one encode/decode call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

/// Codec errors.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Nil pointer is invalid")]
    NilPointer,
    #[error("Unsupported kind: {0}")]
    UnsupportedKind(&'static str),
    #[error("Stream exhausted before the value was complete")]
    ShortRead,
    #[error("Invalid sequence length: {0}")]
    InvalidLength(i64),
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("Destination slice must be pre-sized")]
    UninitializedSlice,
    #[error("Seek landed at {got}, expected {expected}")]
    SeekMismatch { expected: u64, got: u64 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EncodingError>;
