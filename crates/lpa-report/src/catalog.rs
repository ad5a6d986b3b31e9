//! Canned report text
//!
//! A [`ReportCatalog`] maps report keys (`kinesthetic_adhd`, `visual`, ...)
//! to a [`ReportEntry`]. Lookup walks a fallback chain and always ends at
//! the mandatory `default` entry, so it cannot fail.

use crate::error::ReportError;
use indexmap::IndexMap;
use lpa_bank::QuestionBank;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key every catalog must define
pub const DEFAULT_KEY: &str = "default";

/// Placeholder replaced by the child's name
pub const CHILD_PLACEHOLDER: &str = "{child}";

const CLASSIC: &str = include_str!("../data/classic.yaml");
const ENHANCED: &str = include_str!("../data/enhanced.yaml");
const MULTI_DOMAIN: &str = include_str!("../data/multi_domain.yaml");

/// Replace every `{child}` placeholder
#[inline]
#[must_use]
pub fn fill(template: &str, child_name: &str) -> String {
    template.replace(CHILD_PLACEHOLDER, child_name)
}

/// Report text for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Headline
    pub title: String,
    /// One-sentence summary
    pub description: String,
    /// What the child does well
    #[serde(default)]
    pub strengths: Vec<String>,
    /// What the parent can do
    #[serde(default, alias = "recommendations")]
    pub strategies: Vec<String>,
    /// Follow-up activities
    #[serde(default, alias = "nextSteps")]
    pub next_steps: Vec<String>,
}

impl ReportEntry {
    /// Copy with every placeholder filled in
    #[must_use]
    pub fn personalized(&self, child_name: &str) -> Self {
        let all = |items: &[String]| -> Vec<String> { items.iter().map(|s| fill(s, child_name)).collect() };
        Self {
            title: fill(&self.title, child_name),
            description: fill(&self.description, child_name),
            strengths: all(&self.strengths),
            strategies: all(&self.strategies),
            next_steps: all(&self.next_steps),
        }
    }
}

/// Extra section for a secondary domain's winning trait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Section heading
    pub heading: String,
    /// Lead-in sentence
    #[serde(default)]
    pub intro: String,
    /// Bullet points
    pub items: Vec<String>,
}

impl Insight {
    /// Copy with every placeholder filled in
    #[must_use]
    pub fn personalized(&self, child_name: &str) -> Self {
        Self {
            heading: fill(&self.heading, child_name),
            intro: fill(&self.intro, child_name),
            items: self.items.iter().map(|s| fill(s, child_name)).collect(),
        }
    }
}

/// Report entries for one bank version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCatalog {
    /// Bank version this catalog serves
    pub version: String,
    /// Entries by report key
    pub entries: IndexMap<String, ReportEntry>,
    /// Secondary-domain sections by trait key
    #[serde(default)]
    pub insights: IndexMap<String, Insight>,
}

impl ReportCatalog {
    /// Parse a YAML catalog
    ///
    /// # Errors
    /// Returns [`ReportError::Parse`] for malformed YAML and
    /// [`ReportError::MissingDefault`] when no `default` entry exists
    pub fn from_yaml(source: &str) -> Result<Self, ReportError> {
        let catalog: Self = serde_yaml::from_str(source)?;
        if !catalog.entries.contains_key(DEFAULT_KEY) {
            return Err(ReportError::MissingDefault(catalog.version));
        }
        Ok(catalog)
    }

    /// The fallback entry
    #[must_use]
    pub fn default_entry(&self) -> &ReportEntry {
        // from_yaml guarantees the key; an empty placeholder covers catalogs
        // built by hand
        self.entries
            .get(DEFAULT_KEY)
            .or_else(|| self.entries.values().next())
            .unwrap_or(&EMPTY_ENTRY)
    }

    /// First entry matching the chain, else `default`
    ///
    /// Returns the entry and the key that matched.
    pub fn lookup<'a, I, S>(&'a self, keys: I) -> (&'a ReportEntry, &'a str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            if let Some((matched, entry)) = self.entries.get_key_value(key.as_ref()) {
                return (entry, matched.as_str());
            }
        }
        (self.default_entry(), DEFAULT_KEY)
    }

    /// Section for a trait, if the catalog has one
    #[inline]
    #[must_use]
    pub fn insight(&self, trait_key: &str) -> Option<&Insight> {
        self.insights.get(trait_key)
    }

    /// Traits a bank can make primary that have no entry of their own
    ///
    /// These resolve to `default`; each one is logged at warn level.
    #[must_use]
    pub fn validate(&self, bank: &QuestionBank) -> Vec<String> {
        let candidates = match bank.resolution.as_str() {
            // global argmax can crown any awarded trait
            "global-argmax" => bank.traits(),
            _ => bank
                .domains
                .first()
                .map(|d| d.traits.clone())
                .unwrap_or_default(),
        };
        let missing: Vec<String> = candidates
            .iter()
            .map(ToString::to_string)
            .filter(|k| !self.entries.contains_key(k))
            .collect();
        for key in &missing {
            tracing::warn!(
                catalog = %self.version,
                key = %key,
                "report key has no entry and falls back to default"
            );
        }
        missing
    }
}

static EMPTY_ENTRY: ReportEntry = ReportEntry {
    title: String::new(),
    description: String::new(),
    strengths: Vec::new(),
    strategies: Vec::new(),
    next_steps: Vec::new(),
};

/// Catalogs keyed by bank version
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    catalogs: BTreeMap<String, Arc<ReportCatalog>>,
}

impl CatalogSet {
    /// Create new empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create set with the built-in catalogs
    ///
    /// # Errors
    /// Returns the parse error of an embedded catalog
    pub fn with_builtin() -> Result<Self, ReportError> {
        let mut set = Self::new();
        for source in [CLASSIC, ENHANCED, MULTI_DOMAIN] {
            set.register(ReportCatalog::from_yaml(source)?);
        }
        Ok(set)
    }

    /// Register a catalog, replacing any with the same version
    pub fn register(&mut self, catalog: ReportCatalog) {
        self.catalogs
            .insert(catalog.version.clone(), Arc::new(catalog));
    }

    /// Catalog for a bank version
    ///
    /// # Errors
    /// Returns [`ReportError::UnknownCatalog`] if none is registered
    pub fn get(&self, version: &str) -> Result<Arc<ReportCatalog>, ReportError> {
        self.catalogs
            .get(version)
            .cloned()
            .ok_or_else(|| ReportError::UnknownCatalog(version.to_string()))
    }

    /// Registered versions, sorted
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.catalogs.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpa_bank::BankRegistry;

    #[test]
    fn lookup_walks_chain() {
        let set = CatalogSet::with_builtin().unwrap();
        let catalog = set.get("enhanced").unwrap();

        let (entry, key) = catalog.lookup(["kinesthetic_adhd", "kinesthetic"]);
        assert_eq!(key, "kinesthetic_adhd");
        assert!(entry.title.contains("Movement-Based"));

        let (_, key) = catalog.lookup(["reading_adhd", "reading"]);
        assert_eq!(key, "reading");

        let (entry, key) = catalog.lookup(["kinesthetic_adhd_autism", "nonexistent"]);
        assert_eq!(key, DEFAULT_KEY);
        assert_eq!(entry, catalog.default_entry());
    }

    #[test]
    fn empty_chain_gives_default() {
        let set = CatalogSet::with_builtin().unwrap();
        let catalog = set.get("classic").unwrap();
        let (entry, key) = catalog.lookup(Vec::<String>::new());
        assert_eq!(key, DEFAULT_KEY);
        assert_eq!(entry.title, "Visual Learner");
    }

    #[test]
    fn missing_default_is_rejected() {
        let err = ReportCatalog::from_yaml("version: x\nentries:\n  visual:\n    title: t\n    description: d\n")
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingDefault(_)));
    }

    #[test]
    fn personalized_fills_placeholders() {
        let set = CatalogSet::with_builtin().unwrap();
        let catalog = set.get("enhanced").unwrap();
        let (entry, _) = catalog.lookup(["auditory_adhd"]);
        let filled = entry.personalized("Maya");
        assert_eq!(filled.title, "Maya is an Auditory Learner with Dynamic Processing");
        assert!(!filled.description.contains(CHILD_PLACEHOLDER));
    }

    #[test]
    fn classic_adhd_and_autism_fall_back() {
        let banks = BankRegistry::with_builtin().unwrap();
        let set = CatalogSet::with_builtin().unwrap();
        let missing = set.get("classic").unwrap().validate(&banks.get("classic").unwrap());
        assert_eq!(missing, vec!["adhd", "autism"]);
        let enhanced = set.get("enhanced").unwrap().validate(&banks.get("enhanced").unwrap());
        assert!(enhanced.is_empty());
    }

    #[test]
    fn multi_domain_has_insights_for_secondary_domains() {
        let banks = BankRegistry::with_builtin().unwrap();
        let bank = banks.get("multi-domain").unwrap();
        let catalog = CatalogSet::with_builtin().unwrap().get("multi-domain").unwrap();
        for domain in &bank.domains[1..] {
            for trait_key in &domain.traits {
                assert!(catalog.insight(trait_key.as_str()).is_some(), "{trait_key}");
            }
        }
    }
}
