//! Neurodivergent signals, strengths and follow-up urgency
//!
//! Threshold tables over raw trait totals. A signal is an observation worth
//! mentioning to the parent, never a diagnosis.

use crate::sheet::ScoreSheet;
use lpa_bank::Points;
use serde::{Deserialize, Serialize};

/// Urgency starts here
const BASE_URGENCY: u8 = 1;

/// Urgency never exceeds this
const MAX_URGENCY: u8 = 10;

/// A labelled threshold over one trait
#[derive(Debug, Clone, Copy)]
struct Threshold<T> {
    trait_key: &'static str,
    at_least: Points,
    value: T,
}

const SIGNALS: [Threshold<Signal>; 3] = [
    Threshold {
        trait_key: "adhd",
        at_least: Points::from_hundredths(150),
        value: Signal::Adhd,
    },
    Threshold {
        trait_key: "autism",
        at_least: Points::from_hundredths(150),
        value: Signal::Autism,
    },
    Threshold {
        trait_key: "sensory",
        at_least: Points::whole(1),
        value: Signal::Sensory,
    },
];

const STRENGTHS: [Threshold<Strength>; 5] = [
    Threshold {
        trait_key: "creative",
        at_least: Points::whole(2),
        value: Strength::CreativeThinking,
    },
    Threshold {
        trait_key: "detail",
        at_least: Points::whole(2),
        value: Strength::DetailOriented,
    },
    Threshold {
        trait_key: "social",
        at_least: Points::whole(2),
        value: Strength::SocialConnection,
    },
    Threshold {
        trait_key: "pattern",
        at_least: Points::whole(2),
        value: Strength::PatternRecognition,
    },
    Threshold {
        trait_key: "mastery",
        at_least: Points::whole(1),
        value: Strength::DeepFocus,
    },
];

/// Urgency increments: `(trait, threshold, increment)`
const URGENCY_STEPS: [(&str, Points, u8); 4] = [
    ("adhd", Points::whole(2), 3),
    ("autism", Points::whole(2), 3),
    ("sensory", Points::whole(1), 2),
    ("emotional", Points::whole(2), 1),
];

/// Neurodivergent signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// ADHD traits
    Adhd,
    /// Autism traits
    Autism,
    /// Sensory processing differences
    Sensory,
}

impl Signal {
    /// Parent-facing label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adhd => "ADHD traits",
            Self::Autism => "Autism traits",
            Self::Sensory => "Sensory processing differences",
        }
    }

    /// Suffix appended to a report key (`kinesthetic_adhd`)
    #[must_use]
    pub const fn report_suffix(self) -> Option<&'static str> {
        match self {
            Self::Adhd => Some("adhd"),
            Self::Autism => Some("autism"),
            Self::Sensory => None,
        }
    }
}

/// Observed strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    /// Creative Thinking
    CreativeThinking,
    /// Detail-Oriented
    DetailOriented,
    /// Social Connection
    SocialConnection,
    /// Pattern Recognition
    PatternRecognition,
    /// Deep Focus & Mastery
    DeepFocus,
}

impl Strength {
    /// Parent-facing label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreativeThinking => "Creative Thinking",
            Self::DetailOriented => "Detail-Oriented",
            Self::SocialConnection => "Social Connection",
            Self::PatternRecognition => "Pattern Recognition",
            Self::DeepFocus => "Deep Focus & Mastery",
        }
    }
}

fn crossed<T: Copy>(sheet: &ScoreSheet, table: &[Threshold<T>]) -> Vec<T> {
    table
        .iter()
        .filter(|t| sheet.get(t.trait_key) >= t.at_least)
        .map(|t| t.value)
        .collect()
}

/// Signals whose trait crossed its threshold, in fixed order
#[must_use]
pub fn signals(sheet: &ScoreSheet) -> Vec<Signal> {
    crossed(sheet, &SIGNALS)
}

/// Strengths whose trait crossed its threshold, in fixed order
#[must_use]
pub fn strengths(sheet: &ScoreSheet) -> Vec<Strength> {
    crossed(sheet, &STRENGTHS)
}

/// Follow-up urgency from 1 (none) to 10
#[must_use]
pub fn urgency_level(sheet: &ScoreSheet, signals: &[Signal]) -> u8 {
    let mut urgency = BASE_URGENCY;
    for (trait_key, at_least, step) in URGENCY_STEPS {
        if sheet.get(trait_key) >= at_least {
            urgency += step;
        }
    }
    if signals.len() >= 2 {
        urgency += 2;
    }
    if signals.len() >= 3 {
        urgency += 1;
    }
    urgency.min(MAX_URGENCY)
}
