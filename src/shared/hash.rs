//! Content hashing.

use sha2::{Digest, Sha256};

/// SHA-256 of `bytes` as lowercase hex (64 characters).
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
