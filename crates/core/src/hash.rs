//! SHA-256 hashing primitives for container integrity checks

use crate::error::PackError;
use crate::Result;
use sha2::{Digest, Sha256};

/// Length of a SHA-256 digest in bytes
pub const HASH_LEN: usize = 32;

/// A SHA-256 digest of merged content (32 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ContentHash([u8; HASH_LEN]);

impl ContentHash {
    /// Create a new ContentHash from bytes
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a byte slice
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != HASH_LEN * 2 {
            return Err(PackError::Decode(format!(
                "Invalid hex length: expected {} characters, got {}",
                HASH_LEN * 2,
                s.len()
            )));
        }

        let mut bytes = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| PackError::Decode(format!("Invalid hex digest: {}", e)))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash bytes using SHA-256
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    let digest = Sha256::digest(data);
    let mut bytes = [0u8; HASH_LEN];
    bytes.copy_from_slice(&digest);
    ContentHash::from_bytes(bytes)
}

/// Hash the UTF-8 bytes of a string
pub fn hash_str(text: &str) -> ContentHash {
    hash_bytes(text.as_bytes())
}
