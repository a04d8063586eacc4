//! Content fingerprints used by every matcher.
//!
//! A fingerprint is a SHA-256 digest of normalized content, so two cells or
//! rows with the same normalized text always compare equal no matter which
//! document they came from.

use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Normalize text for comparison: trim, lowercase, collapse internal whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint of a text after normalization.
    pub fn of_text(text: &str) -> Self {
        Self::of_normalized(&normalize_text(text))
    }

    /// Fingerprint of text that is already normalized.
    pub fn of_normalized(normalized: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Fingerprint of an ordered sequence of fingerprints.
    ///
    /// The sequence length is mixed in so an empty sequence and a sequence
    /// of one empty cell stay distinct.
    pub fn of_sequence<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        let mut hasher = Sha256::new();
        let mut count: u64 = 0;
        for part in parts {
            hasher.update(part.0);
            count += 1;
        }
        hasher.update(count.to_le_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps test failure output readable.
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
