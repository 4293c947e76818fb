//! Content hashing for generated artifacts

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 content hash.
///
/// Generated artifacts carry the hash of the schema set they were compiled
/// from, so unchanged schemas never rewrite (and never rebuild) outputs.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute a hash from bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Compute a hash over several chunks, each length-prefixed so that
    /// chunk boundaries are part of the content
    pub fn from_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Sha256::new();
        for chunk in chunks {
            hasher.update((chunk.len() as u64).to_le_bytes());
            hasher.update(chunk);
        }
        Self(hasher.finalize().into())
    }

    /// Get the hash as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the hash as a prefixed hex string (e.g., "sha256:abcdef...")
    pub fn to_prefixed_hex(&self) -> String {
        format!("sha256:{}", self.to_hex())
    }

    /// Parse a prefixed hex string back into a ContentHash
    pub fn from_prefixed_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix("sha256:")?;
        if hex.len() != 64 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_hashing() {
        assert_eq!(ContentHash::from_bytes(b"hello"), ContentHash::from_bytes(b"hello"));
        assert_ne!(ContentHash::from_bytes(b"hello"), ContentHash::from_bytes(b"world"));
    }

    #[test]
    fn test_chunk_boundaries_matter() {
        let a = ContentHash::from_chunks([b"ab".as_slice(), b"c".as_slice()]);
        let b = ContentHash::from_chunks([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefixed_hex_roundtrip() {
        let h = ContentHash::from_bytes(b"schema");
        let prefixed = h.to_prefixed_hex();
        assert!(prefixed.starts_with("sha256:"));
        assert_eq!(ContentHash::from_prefixed_hex(&prefixed), Some(h));
    }

    #[test]
    fn test_from_prefixed_hex_invalid() {
        assert!(ContentHash::from_prefixed_hex("md5:abc").is_none());
        assert!(ContentHash::from_prefixed_hex("sha256:tooshort").is_none());
    }
}
