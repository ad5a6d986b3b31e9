//! Identifiers used by question banks
//!
//! - [`QuestionId`]: numeric question identifier, unique within a bank
//! - [`OptionId`]: short uppercase option label (`A`, `B`, ...)
//! - [`TraitKey`]: lowercase trait name (`visual`, `adhd`, ...)

use crate::error::BankError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Question identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl Display for QuestionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QuestionId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Answer option label
///
/// Normalized to uppercase so `"b"` and `"B"` address the same option.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionId(String);

impl OptionId {
    /// Get the label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OptionId {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > 4
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(BankError::InvalidOptionId(s.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for OptionId {
    type Error = BankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OptionId> for String {
    fn from(id: OptionId) -> Self {
        id.0
    }
}

impl Display for OptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait name awarded by answer options
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraitKey(String);

impl TraitKey {
    /// Create a trait key, validating the format
    ///
    /// # Errors
    /// Returns [`BankError::InvalidTraitKey`] unless the key is non-empty
    /// lowercase ASCII letters, digits and underscores starting with a letter.
    pub fn new(key: impl Into<String>) -> Result<Self, BankError> {
        let key = key.into();
        let mut chars = key.chars();
        let valid_head = chars.next().is_some_and(|c| c.is_ascii_lowercase());
        let valid_tail = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if valid_head && valid_tail {
            Ok(Self(key))
        } else {
            Err(BankError::InvalidTraitKey(key))
        }
    }

    /// Get the key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TraitKey {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TraitKey {
    type Error = BankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TraitKey> for String {
    fn from(key: TraitKey) -> Self {
        key.0
    }
}

impl AsRef<str> for TraitKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for TraitKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for TraitKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_id_normalizes_case() {
        let id: OptionId = " b ".parse().unwrap();
        assert_eq!(id.as_str(), "B");
    }

    #[test]
    fn option_id_rejects_garbage() {
        assert!("".parse::<OptionId>().is_err());
        assert!("A-1".parse::<OptionId>().is_err());
        assert!("TOOLONG".parse::<OptionId>().is_err());
    }

    #[test]
    fn trait_key_format() {
        assert!(TraitKey::new("visual").is_ok());
        assert!(TraitKey::new("time_management").is_ok());
        assert!(TraitKey::new("Visual").is_err());
        assert!(TraitKey::new("1st").is_err());
        assert!(TraitKey::new("").is_err());
    }

    #[test]
    fn trait_key_serde_roundtrip_validates() {
        let key: TraitKey = serde_json::from_str("\"adhd\"").unwrap();
        assert_eq!(key.as_str(), "adhd");
        assert!(serde_json::from_str::<TraitKey>("\"ADHD\"").is_err());
    }
}
