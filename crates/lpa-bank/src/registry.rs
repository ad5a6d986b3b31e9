//! Registry of question bank versions
//!
//! The three product iterations ship embedded in the binary; additional banks
//! can be registered at runtime (e.g. loaded from disk by the CLI).

use crate::bank::QuestionBank;
use crate::error::BankError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Version served when a caller does not name one
pub const DEFAULT_VERSION: &str = "enhanced";

const CLASSIC: &str = include_str!("../data/classic.yaml");
const ENHANCED: &str = include_str!("../data/enhanced.yaml");
const MULTI_DOMAIN: &str = include_str!("../data/multi_domain.yaml");

/// Question banks keyed by version
#[derive(Debug, Default, Clone)]
pub struct BankRegistry {
    banks: BTreeMap<String, Arc<QuestionBank>>,
}

impl BankRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            banks: BTreeMap::new(),
        }
    }

    /// Create registry with the built-in banks (`classic`, `enhanced`,
    /// `multi-domain`)
    ///
    /// # Errors
    /// Returns the validation error of an embedded definition
    pub fn with_builtin() -> Result<Self, BankError> {
        let mut registry = Self::new();
        for source in [CLASSIC, ENHANCED, MULTI_DOMAIN] {
            registry.register(QuestionBank::from_yaml(source)?);
        }
        Ok(registry)
    }

    /// Register a bank, replacing any bank with the same version
    pub fn register(&mut self, bank: QuestionBank) -> Option<Arc<QuestionBank>> {
        tracing::debug!(
            version = %bank.version,
            questions = bank.len(),
            fingerprint = %bank.fingerprint().short(),
            "registered question bank"
        );
        self.banks.insert(bank.version.clone(), Arc::new(bank))
    }

    /// Get a bank by version
    ///
    /// # Errors
    /// Returns [`BankError::UnknownVersion`] if no bank is registered
    pub fn get(&self, version: &str) -> Result<Arc<QuestionBank>, BankError> {
        self.banks
            .get(version)
            .cloned()
            .ok_or_else(|| BankError::UnknownVersion(version.to_string()))
    }

    /// Check if a version is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, version: &str) -> bool {
        self.banks.contains_key(version)
    }

    /// Registered versions in sorted order
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.banks.keys().map(String::as_str).collect()
    }

    /// Iterate over registered banks
    pub fn iter(&self) -> impl Iterator<Item = &Arc<QuestionBank>> {
        self.banks.values()
    }

    /// Number of registered banks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.banks.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}
