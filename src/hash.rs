//! Content hashing for duplicate detection.
//!
//! The digest is the identity of a submission: two files with the same bytes
//! are the same photograph as far as the history is concerned. SHA-256 makes
//! accidental collisions a non-concern; the hex form is what gets persisted
//! and compared.

use sha2::{Digest, Sha256};

/// SHA-256 digest of a byte buffer as a lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}
