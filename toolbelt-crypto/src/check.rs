//! Hex digest format checks.  Case insensitive; no surrounding whitespace.

fn is_hex_of_len(hash: &str, len: usize) -> bool {
    hash.len() == len && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn is_md5(hash: &str) -> bool {
    is_hex_of_len(hash, 32)
}

pub fn is_sha1(hash: &str) -> bool {
    is_hex_of_len(hash, 40)
}

pub fn is_sha256(hash: &str) -> bool {
    is_hex_of_len(hash, 64)
}

pub fn is_sha512(hash: &str) -> bool {
    is_hex_of_len(hash, 128)
}

/// Any of the four supported digest formats.
pub fn is_valid_hash(hash: &str) -> bool {
    is_md5(hash) || is_sha1(hash) || is_sha256(hash) || is_sha512(hash)
}
