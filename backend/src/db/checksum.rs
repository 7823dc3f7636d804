//! Upload checksums recorded with every batch.

use sha2::{Digest, Sha256};

/// SHA-256 of the raw uploaded bytes, hex encoded.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
