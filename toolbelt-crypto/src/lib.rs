//! # toolbelt-crypto: message digests as hex strings
//!
//! ```text
//!  &[u8] ──► md5 / sha1 / sha256 / sha512 ──► lowercase hex
//!  file  ──► Hashes::from_path (one pass, four hashers) ──► JSON-ready record
//!  &str  ──► is_md5 / is_sha1 / is_sha256 / is_sha512 / is_valid_hash
//! ```
//!
//! - **`digest`**: one-shot and streaming digests.
//! - **`check`**: format checks for hex digests.

pub mod check;
pub mod digest;

use thiserror::Error;

pub use check::{is_md5, is_sha1, is_sha256, is_sha512, is_valid_hash};
pub use digest::{md5, sha1, sha256, sha512, Hashes};

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
