//! Resolved learning profile

use crate::indicators::{Signal, Strength};
use crate::percentile::Percentile;
use crate::resolve::DomainOutcome;
use crate::sheet::ScoreSheet;
use serde::{Deserialize, Serialize};

/// Primary style reported when no answer scored anything
pub const BALANCED: &str = "balanced";

/// Outcome of a resolution strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Strategy that produced this profile
    pub strategy: String,
    /// Primary learning style
    pub primary: String,
    /// Secondary learning style
    pub secondary: Option<String>,
    /// Per-domain outcomes, in bank order
    pub domains: Vec<DomainOutcome>,
    /// Neurodivergent signals
    #[serde(default)]
    pub signals: Vec<Signal>,
    /// Observed strengths
    #[serde(default)]
    pub strengths: Vec<Strength>,
    /// Follow-up urgency (1 to 10)
    pub urgency: u8,
    /// Report catalog keys to try, most specific first
    pub report_keys: Vec<String>,
}

impl Profile {
    /// Outcome for a domain
    #[must_use]
    pub fn domain(&self, key: &str) -> Option<&DomainOutcome> {
        self.domains.iter().find(|d| d.domain == key)
    }

    /// Percentile of the leading domain
    #[must_use]
    pub fn percentile(&self) -> Option<Percentile> {
        self.domains.first().map(|d| d.percentile)
    }

    /// Check if any neurodivergent signal was raised
    #[inline]
    #[must_use]
    pub fn has_signals(&self) -> bool {
        !self.signals.is_empty()
    }

    /// Signal labels for display
    #[must_use]
    pub fn signal_labels(&self) -> Vec<&'static str> {
        self.signals.iter().map(|s| s.label()).collect()
    }

    /// Strength labels for display
    #[must_use]
    pub fn strength_labels(&self) -> Vec<&'static str> {
        self.strengths.iter().map(|s| s.label()).collect()
    }
}

/// Scores and the profile resolved from them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Aggregated totals
    pub sheet: ScoreSheet,
    /// Resolved profile
    pub profile: Profile,
}
