use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ClaimError;

/// SHA-256 of the raw PDF bytes; the document record's identity (spec.md §3).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DocumentHash(String);

impl DocumentHash {
    /// Hashes `bytes` and wraps the lower-case hex digest.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(hex::encode(digest))
    }

    /// Parses an existing hex digest, e.g. read back from the database.
    pub fn from_hex(s: &str) -> Result<Self, ClaimError> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ClaimError::InvalidConfiguration(format!(
                "'{s}' is not a 64-character hex SHA-256 digest"
            )));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_hash() {
        let a = DocumentHash::of(b"hello world");
        let b = DocumentHash::of(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_bytes_different_hash() {
        assert_ne!(DocumentHash::of(b"a"), DocumentHash::of(b"b"));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(DocumentHash::from_hex("not-hex").is_err());
    }
}
