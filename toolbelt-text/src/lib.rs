//! # toolbelt-text: byte and text stream utilities
//!
//! Pull-based helpers over `std::io` readers.  Every producer is an
//! iterator or a cursor-style type; nothing spawns threads.
//!
//! ## Architecture
//!
//! ```text
//!  Read ──► NgramGenerator ──► Ngram ──► hash() (FNV-1a 64)
//!  Read + Seek ──► FastGenerator (seek back n-1 per step)
//!  Read ──► entropy::reader_entropy ──► bits per byte
//!  BufRead ──► Scanner ──► Token::{Word, Whitespace, Eof}
//!  Read + Seek ──► ReverseReader ──► reversed_lines
//!  &[u8] ──► SubmatchHelper::prepare ──► parse::<T>(name)
//! ```
//!
//! - **`ngram`**: sliding byte windows over a stream.
//! - **`entropy`**: Shannon entropy of a byte stream.
//! - **`scanner`**: word splitter with a configurable whitespace table.
//! - **`readers`**: backward reader and line iterators.
//! - **`stats`**: mean and standard deviation helpers.
//! - **`submatch`**: named regex groups parsed into typed fields.

pub mod entropy;
pub mod ngram;
pub mod readers;
pub mod scanner;
pub mod stats;
pub mod submatch;

use thiserror::Error;

pub use ngram::{FastGenerator, Ngram, NgramConfig, NgramGenerator};
pub use readers::{lines, reversed_lines, utf16_lines, ReverseReader};
pub use scanner::{Scanner, ScannerConfig, Token};
pub use submatch::{FromMatch, FromSubmatch, SubmatchHelper};

#[derive(Error, Debug)]
pub enum TextError {
    #[error("Ngram size must be greater than zero")]
    BadNgramSize,
    #[error("Token longer than {0} characters")]
    TokenTooLong(usize),
    #[error("Invalid UTF-8 sequence")]
    InvalidRune,
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("No such key: {0}")]
    NoSuchKey(String),
    #[error("Group {0} did not take part in the match")]
    GroupNotMatched(String),
    #[error("Cannot parse group {key} as {ty}")]
    Unparsable { key: String, ty: &'static str },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TextError>;
