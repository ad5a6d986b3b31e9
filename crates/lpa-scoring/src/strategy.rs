//! Resolution strategies
//!
//! Each product iteration turns a [`ScoreSheet`] into a [`Profile`]
//! differently:
//!
//! - [`GlobalArgmax`]: best trait over the whole sheet
//! - [`PrioritizedDomain`]: best trait of one domain, plus signals and
//!   strengths
//! - [`MultiDomain`]: every domain resolved independently

use crate::error::ScoringError;
use crate::indicators::{signals, strengths, urgency_level};
use crate::profile::{Profile, BALANCED};
use crate::resolve::{rank, resolve_domain, DomainOutcome};
use crate::sheet::ScoreSheet;
use lpa_bank::{Domain, QuestionBank};

/// Turns trait totals into a profile
pub trait ResolutionStrategy: Send + Sync + std::fmt::Debug {
    /// Resolve a profile
    ///
    /// # Errors
    /// Returns [`ScoringError`] when the bank lacks the domains the
    /// strategy needs
    fn resolve(&self, bank: &QuestionBank, sheet: &ScoreSheet) -> Result<Profile, ScoringError>;

    /// Strategy name (matches `QuestionBank::resolution`)
    fn name(&self) -> &'static str;
}

fn resolve_all(bank: &QuestionBank, sheet: &ScoreSheet) -> Vec<DomainOutcome> {
    bank.domains
        .iter()
        .filter_map(|d| resolve_domain(sheet, d))
        .collect()
}

/// Primary and secondary over every trait the bank awards
///
/// Ties go to the trait declared first. An empty sheet is [`BALANCED`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalArgmax;

impl GlobalArgmax {
    /// Strategy name
    pub const NAME: &'static str = "global-argmax";
}

impl ResolutionStrategy for GlobalArgmax {
    fn resolve(&self, bank: &QuestionBank, sheet: &ScoreSheet) -> Result<Profile, ScoringError> {
        let traits = bank.traits();
        let mut scored = rank(sheet, &traits)
            .into_iter()
            .filter(|t| !t.points.is_zero())
            .map(|t| t.trait_key.to_string());

        let primary = scored.next().unwrap_or_else(|| BALANCED.to_string());
        let secondary = scored.next();

        Ok(Profile {
            strategy: Self::NAME.to_string(),
            report_keys: vec![primary.clone()],
            primary,
            secondary,
            domains: resolve_all(bank, sheet),
            signals: Vec::new(),
            strengths: Vec::new(),
            urgency: urgency_level(sheet, &[]),
        })
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Resolve one domain by priority and derive indicators
///
/// Uses the bank's first domain unless a key is given. The report key is
/// the primary style suffixed with `_adhd` and/or `_autism` when those
/// signals were raised, falling back to the bare style.
#[derive(Debug, Clone, Default)]
pub struct PrioritizedDomain {
    domain: Option<String>,
}

impl PrioritizedDomain {
    /// Strategy name
    pub const NAME: &'static str = "prioritized-domain";

    /// Create strategy resolving the bank's first domain
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a named domain instead of the first one
    #[inline]
    #[must_use]
    pub fn for_domain(key: impl Into<String>) -> Self {
        Self {
            domain: Some(key.into()),
        }
    }

    fn pick<'a>(&self, bank: &'a QuestionBank) -> Result<&'a Domain, ScoringError> {
        match &self.domain {
            Some(key) => bank.domain(key).ok_or_else(|| ScoringError::MissingDomain {
                version: bank.version.clone(),
                domain: key.clone(),
            }),
            None => bank
                .domains
                .first()
                .ok_or_else(|| ScoringError::NoDomains(bank.version.clone())),
        }
    }
}

impl ResolutionStrategy for PrioritizedDomain {
    fn resolve(&self, bank: &QuestionBank, sheet: &ScoreSheet) -> Result<Profile, ScoringError> {
        let domain = self.pick(bank)?;
        let outcome = resolve_domain(sheet, domain)
            .ok_or_else(|| ScoringError::NoDomains(bank.version.clone()))?;

        let signals = signals(sheet);
        let primary = outcome.primary.to_string();
        let mut specific = primary.clone();
        for suffix in signals.iter().filter_map(|s| s.report_suffix()) {
            specific.push('_');
            specific.push_str(suffix);
        }
        let mut report_keys = vec![specific];
        if report_keys[0] != primary {
            report_keys.push(primary.clone());
        }

        Ok(Profile {
            strategy: Self::NAME.to_string(),
            primary,
            secondary: outcome.secondary.as_ref().map(ToString::to_string),
            urgency: urgency_level(sheet, &signals),
            strengths: strengths(sheet),
            signals,
            domains: vec![outcome],
            report_keys,
        })
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Resolve every domain independently
///
/// The first domain names the primary style.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiDomain;

impl MultiDomain {
    /// Strategy name
    pub const NAME: &'static str = "multi-domain";
}

impl ResolutionStrategy for MultiDomain {
    fn resolve(&self, bank: &QuestionBank, sheet: &ScoreSheet) -> Result<Profile, ScoringError> {
        let domains = resolve_all(bank, sheet);
        let lead = domains
            .first()
            .ok_or_else(|| ScoringError::NoDomains(bank.version.clone()))?;
        let primary = lead.primary.to_string();

        Ok(Profile {
            strategy: Self::NAME.to_string(),
            report_keys: vec![primary.clone()],
            primary,
            secondary: lead.secondary.as_ref().map(ToString::to_string),
            domains,
            signals: Vec::new(),
            strengths: Vec::new(),
            urgency: urgency_level(sheet, &[]),
        })
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{aggregate, Answer};
    use lpa_bank::BankRegistry;

    fn answers(pairs: &[(u32, &str)]) -> Vec<Answer> {
        pairs
            .iter()
            .map(|(q, o)| Answer::new(*q, o.parse().unwrap()))
            .collect()
    }

    fn bank(version: &str) -> std::sync::Arc<QuestionBank> {
        BankRegistry::with_builtin().unwrap().get(version).unwrap()
    }

    #[test]
    fn global_argmax_empty_is_balanced() {
        let bank = bank("classic");
        let profile = GlobalArgmax.resolve(&bank, &ScoreSheet::new()).unwrap();
        assert_eq!(profile.primary, BALANCED);
        assert!(profile.secondary.is_none());
        assert_eq!(profile.report_keys, vec!["balanced"]);
    }

    #[test]
    fn global_argmax_considers_every_trait() {
        let bank = bank("classic");
        // adhd 1 + 1 + 0.5 = 2.5 beats kinesthetic 1
        let sheet = aggregate(&bank, &answers(&[(3, "B"), (5, "D"), (3, "A")]));
        let profile = GlobalArgmax.resolve(&bank, &sheet).unwrap();
        assert_eq!(profile.primary, "adhd");
        assert_eq!(profile.secondary.as_deref(), Some("kinesthetic"));
    }

    #[test]
    fn global_argmax_tie_uses_declaration_order() {
        let bank = bank("classic");
        let sheet = aggregate(&bank, &answers(&[(1, "C"), (2, "A")]));
        let profile = GlobalArgmax.resolve(&bank, &sheet).unwrap();
        assert_eq!(profile.primary, "visual");
        assert_eq!(profile.secondary.as_deref(), Some("auditory"));
    }

    #[test]
    fn prioritized_builds_specific_report_key() {
        let bank = bank("enhanced");
        let sheet = aggregate(
            &bank,
            &answers(&[(1, "B"), (2, "B"), (5, "A"), (6, "B"), (8, "A")]),
        );
        let profile = PrioritizedDomain::new().resolve(&bank, &sheet).unwrap();
        assert_eq!(profile.primary, "kinesthetic");
        assert_eq!(profile.report_keys, vec!["kinesthetic_adhd", "kinesthetic"]);
        assert_eq!(profile.signal_labels(), vec!["ADHD traits"]);
        assert_eq!(profile.urgency, 4);
    }

    #[test]
    fn prioritized_tie_prefers_kinesthetic() {
        let bank = bank("enhanced");
        let sheet = aggregate(&bank, &answers(&[(1, "A"), (2, "B")]));
        let profile = PrioritizedDomain::new().resolve(&bank, &sheet).unwrap();
        assert_eq!(profile.primary, "kinesthetic");
        assert_eq!(profile.secondary.as_deref(), Some("visual"));
        assert_eq!(profile.report_keys, vec!["kinesthetic"]);
    }

    #[test]
    fn prioritized_missing_domain() {
        let bank = bank("enhanced");
        let err = PrioritizedDomain::for_domain("processing")
            .resolve(&bank, &ScoreSheet::new())
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn multi_domain_resolves_each_domain() {
        let bank = bank("multi-domain");
        let sheet = aggregate(
            &bank,
            &answers(&[
                (1, "D"), (2, "D"), (3, "D"), (4, "D"),
                (5, "B"), (6, "B"), (7, "B"), (8, "B"),
                (9, "C"), (10, "C"), (11, "A"), (12, "C"),
            ]),
        );
        let profile = MultiDomain.resolve(&bank, &sheet).unwrap();

        assert_eq!(profile.primary, "text");
        assert_eq!(profile.domains.len(), 3);

        let processing = profile.domain("processing").unwrap();
        assert_eq!(processing.raw.as_f64(), 12.0);
        assert_eq!(processing.percentile.get(), 95);

        let executive = profile.domain("executive_function").unwrap();
        assert_eq!(executive.primary.as_str(), "organization");

        let motivation = profile.domain("motivation").unwrap();
        assert_eq!(motivation.primary.as_str(), "connection");
        assert_eq!(motivation.raw.as_f64(), 9.0);
        assert_eq!(motivation.percentile.get(), 85);
        assert_eq!(motivation.secondary.as_ref().unwrap().as_str(), "curiosity");
    }
}
