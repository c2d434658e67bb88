//! Hex digests of buffers, readers and files.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::Result;

const CHUNK: usize = 4096;

fn to_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        encoded.push_str(&format!("{:02x}", byte));
    }
    encoded
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    to_hex(&D::digest(data))
}

/// Lowercase hex MD5 of `data`.
pub fn md5(data: &[u8]) -> String {
    hex_digest::<Md5>(data)
}

pub fn sha1(data: &[u8]) -> String {
    hex_digest::<Sha1>(data)
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> String {
    hex_digest::<Sha256>(data)
}

pub fn sha512(data: &[u8]) -> String {
    hex_digest::<Sha512>(data)
}

/// All four digests of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hashes {
    pub path: String,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub sha512: String,
}

impl Hashes {
    /// Hash the file at `path`, reading it once.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut hashes = Self::from_reader(file)?;
        hashes.path = path.display().to_string();
        log::debug!("hashed {}", hashes.path);
        Ok(hashes)
    }

    /// Hash everything left in `reader`.  `path` is left empty.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut md5 = Md5::new();
        let mut sha1 = Sha1::new();
        let mut sha256 = Sha256::new();
        let mut sha512 = Sha512::new();

        let mut buf = [0u8; CHUNK];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            md5.update(&buf[..n]);
            sha1.update(&buf[..n]);
            sha256.update(&buf[..n]);
            sha512.update(&buf[..n]);
        }

        Ok(Self {
            path: String::new(),
            md5: to_hex(&md5.finalize()),
            sha1: to_hex(&sha1.finalize()),
            sha256: to_hex(&sha256.finalize()),
            sha512: to_hex(&sha512.finalize()),
        })
    }
}
