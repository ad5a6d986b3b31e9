//! Strategy registry
//!
//! Maps the `resolution` name a bank declares to a [`ResolutionStrategy`].

use crate::error::ScoringError;
use crate::profile::Evaluation;
use crate::sheet::{aggregate, Answer};
use crate::strategy::{GlobalArgmax, MultiDomain, PrioritizedDomain, ResolutionStrategy};
use lpa_bank::QuestionBank;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of resolution strategies
#[derive(Debug, Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ResolutionStrategy>>,
}

impl StrategyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Create registry with the built-in strategies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(GlobalArgmax);
        registry.register(PrioritizedDomain::new());
        registry.register(MultiDomain);
        registry
    }

    /// Register a strategy under its own name
    pub fn register<S: ResolutionStrategy + 'static>(&mut self, strategy: S) {
        self.strategies
            .insert(strategy.name().to_string(), Arc::new(strategy));
    }

    /// Check if strategy exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Get a strategy by name
    ///
    /// # Errors
    /// Returns [`ScoringError::UnknownStrategy`] if none is registered
    pub fn get(&self, name: &str) -> Result<Arc<dyn ResolutionStrategy>, ScoringError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| ScoringError::UnknownStrategy(name.to_string()))
    }

    /// Strategy a bank asks for
    ///
    /// # Errors
    /// Returns [`ScoringError::UnknownStrategy`] if the bank names an
    /// unregistered strategy
    pub fn select(&self, bank: &QuestionBank) -> Result<Arc<dyn ResolutionStrategy>, ScoringError> {
        self.get(&bank.resolution)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get number of registered strategies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Aggregate answers and resolve them with the bank's strategy
    ///
    /// # Errors
    /// Returns [`ScoringError`] if the strategy is unknown or cannot resolve
    /// the bank
    pub fn evaluate(&self, bank: &QuestionBank, answers: &[Answer]) -> Result<Evaluation, ScoringError> {
        let strategy = self.select(bank)?;
        let sheet = aggregate(bank, answers);
        let profile = strategy.resolve(bank, &sheet)?;
        tracing::debug!(
            bank = %bank.version,
            strategy = strategy.name(),
            counted = sheet.counted(),
            skipped = sheet.skipped().len(),
            primary = %profile.primary,
            "evaluated answers"
        );
        Ok(Evaluation { sheet, profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpa_bank::BankRegistry;

    #[test]
    fn registry_new_empty() {
        let registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["global-argmax", "multi-domain", "prioritized-domain"]
        );
    }

    #[test]
    fn registry_unknown_strategy() {
        let registry = StrategyRegistry::with_defaults();
        let err = registry.get("weighted-vote").unwrap_err();
        assert!(matches!(err, ScoringError::UnknownStrategy(_)));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn registry_register_replaces_by_name() {
        let mut registry = StrategyRegistry::with_defaults();
        registry.register(PrioritizedDomain::for_domain("focus"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn every_builtin_bank_has_a_strategy() {
        let registry = StrategyRegistry::with_defaults();
        for bank in BankRegistry::with_builtin().unwrap().iter() {
            assert!(registry.select(bank).is_ok(), "{}", bank.version);
        }
    }

    #[test]
    fn evaluate_empty_answers() {
        let registry = StrategyRegistry::with_defaults();
        let bank = BankRegistry::with_builtin().unwrap().get("classic").unwrap();
        let evaluation = registry.evaluate(&bank, &[]).unwrap();
        assert!(evaluation.sheet.is_empty());
        assert_eq!(evaluation.profile.primary, "balanced");
    }
}
