//! Domain resolution
//!
//! Argmax over a domain's traits with a deterministic tie-break: traits with
//! equal totals keep the domain's declared priority order.

use crate::percentile::{percentile_for, Percentile};
use crate::sheet::ScoreSheet;
use lpa_bank::{Domain, Points, TraitKey};
use serde::{Deserialize, Serialize};

/// A trait and its total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitScore {
    /// Trait key
    #[serde(rename = "trait")]
    pub trait_key: TraitKey,
    /// Total points
    pub points: Points,
}

/// Result of resolving one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOutcome {
    /// Domain key
    pub domain: String,
    /// Domain display label
    pub label: String,
    /// Winning trait
    pub primary: TraitKey,
    /// Runner-up, when it scored anything
    pub secondary: Option<TraitKey>,
    /// Winning trait's total
    pub raw: Points,
    /// Bucketed percentile of `raw`
    pub percentile: Percentile,
    /// Every trait of the domain, best first
    pub ranking: Vec<TraitScore>,
}

/// Order traits by total, highest first, keeping the given order for ties
#[must_use]
pub fn rank<'a, I>(sheet: &ScoreSheet, traits: I) -> Vec<TraitScore>
where
    I: IntoIterator<Item = &'a TraitKey>,
{
    let mut ranking: Vec<TraitScore> = traits
        .into_iter()
        .map(|t| TraitScore {
            trait_key: t.clone(),
            points: sheet.get(t.as_str()),
        })
        .collect();
    // sort_by is stable, so equal totals stay in priority order
    ranking.sort_by(|a, b| b.points.cmp(&a.points));
    ranking
}

/// Resolve a domain's primary and secondary trait
///
/// Returns `None` only for a domain without traits, which bank validation
/// rejects.
#[must_use]
pub fn resolve_domain(sheet: &ScoreSheet, domain: &Domain) -> Option<DomainOutcome> {
    let ranking = rank(sheet, &domain.traits);
    let first = ranking.first()?;
    let secondary = ranking
        .get(1)
        .filter(|s| !s.points.is_zero())
        .map(|s| s.trait_key.clone());

    Some(DomainOutcome {
        domain: domain.key.clone(),
        label: domain.label.clone(),
        primary: first.trait_key.clone(),
        secondary,
        raw: first.points,
        percentile: percentile_for(first.points),
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(traits: &[&str]) -> Domain {
        Domain {
            key: "style".into(),
            label: "Style".into(),
            traits: traits.iter().map(|t| t.parse().unwrap()).collect(),
        }
    }

    fn sheet(entries: &[(&str, u32)]) -> ScoreSheet {
        let mut sheet = ScoreSheet::new();
        for (k, v) in entries {
            sheet.add(&k.parse().unwrap(), Points::from_hundredths(*v));
        }
        sheet
    }

    #[test]
    fn highest_total_wins() {
        let d = domain(&["kinesthetic", "visual", "auditory", "reading"]);
        let outcome = resolve_domain(&sheet(&[("visual", 300), ("auditory", 100)]), &d).unwrap();
        assert_eq!(outcome.primary.as_str(), "visual");
        assert_eq!(outcome.secondary.unwrap().as_str(), "auditory");
        assert_eq!(outcome.raw, Points::whole(3));
        assert_eq!(outcome.percentile.get(), 40);
    }

    #[test]
    fn tie_goes_to_priority() {
        let d = domain(&["kinesthetic", "visual", "auditory", "reading"]);
        let outcome = resolve_domain(&sheet(&[("visual", 200), ("kinesthetic", 200)]), &d).unwrap();
        assert_eq!(outcome.primary.as_str(), "kinesthetic");
        assert_eq!(outcome.secondary.unwrap().as_str(), "visual");
    }

    #[test]
    fn empty_sheet_picks_highest_priority_without_secondary() {
        let d = domain(&["kinesthetic", "visual"]);
        let outcome = resolve_domain(&ScoreSheet::new(), &d).unwrap();
        assert_eq!(outcome.primary.as_str(), "kinesthetic");
        assert!(outcome.secondary.is_none());
        assert_eq!(outcome.percentile.get(), 25);
    }

    #[test]
    fn traits_outside_domain_are_ignored() {
        let d = domain(&["visual", "auditory"]);
        let outcome = resolve_domain(&sheet(&[("adhd", 900), ("auditory", 100)]), &d).unwrap();
        assert_eq!(outcome.primary.as_str(), "auditory");
        assert_eq!(outcome.ranking.len(), 2);
    }

    #[test]
    fn empty_domain_resolves_to_none() {
        assert!(resolve_domain(&ScoreSheet::new(), &domain(&[])).is_none());
    }
}
