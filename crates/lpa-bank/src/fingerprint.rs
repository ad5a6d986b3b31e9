//! Content fingerprints for question banks
//!
//! A stored assessment carries the fingerprint of the bank it was scored
//! against, so results stay traceable after the wording or weights change.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// 32-byte Blake3 digest of a bank's canonical JSON form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the digest of arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Compute the digest of a value's JSON encoding
    ///
    /// # Errors
    /// Returns the serialization error if the value cannot be encoded
    pub fn of_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::compute(&serde_json::to_vec(value)?))
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short form (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("fingerprint must be 32 bytes"))?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(Fingerprint::compute(b"bank"), Fingerprint::compute(b"bank"));
        assert_ne!(Fingerprint::compute(b"bank"), Fingerprint::compute(b"bank2"));
    }

    #[test]
    fn fingerprint_hex_roundtrip() {
        let fp = Fingerprint::compute(b"bank");
        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, back);
        assert_eq!(fp.short().len(), 16);
    }
}
