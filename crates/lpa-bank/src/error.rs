//! Error types for question banks

use crate::ids::{OptionId, QuestionId, TraitKey};

/// Question bank errors
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// Definition could not be parsed
    #[error("failed to parse bank definition: {0}")]
    Parse(String),

    /// Malformed trait key
    #[error("invalid trait key `{0}`")]
    InvalidTraitKey(String),

    /// Malformed option label
    #[error("invalid option id `{0}`")]
    InvalidOptionId(String),

    /// Weight is negative, NaN or too large
    #[error("invalid weight {0}: weights must be finite and non-negative")]
    InvalidWeight(f64),

    /// Bank declares no questions
    #[error("bank `{0}` has no questions")]
    NoQuestions(String),

    /// Question id used twice
    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),

    /// Option label used twice within a question
    #[error("question {question} has duplicate option {option}")]
    DuplicateOption {
        /// Question holding the duplicate
        question: QuestionId,
        /// Repeated label
        option: OptionId,
    },

    /// Option awards nothing
    #[error("question {question} option {option} awards no points")]
    EmptyOption {
        /// Question holding the option
        question: QuestionId,
        /// Offending option
        option: OptionId,
    },

    /// Option awards a zero weight
    #[error("question {question} option {option} awards zero points to `{trait_key}`")]
    ZeroWeight {
        /// Question holding the option
        question: QuestionId,
        /// Offending option
        option: OptionId,
        /// Trait with the zero weight
        trait_key: TraitKey,
    },

    /// Domain declares no traits
    #[error("domain `{0}` declares no traits")]
    EmptyDomain(String),

    /// Domain key used twice
    #[error("duplicate domain `{0}`")]
    DuplicateDomain(String),

    /// Trait appears in more than one domain
    #[error("trait `{0}` is declared in more than one domain")]
    OverlappingDomain(TraitKey),

    /// Option awards a trait that no domain owns
    #[error("trait `{0}` is awarded but belongs to no domain")]
    UnassignedTrait(TraitKey),

    /// Registry lookup failed
    #[error("unknown bank version `{0}`")]
    UnknownVersion(String),
}

impl BankError {
    /// Check if the error is a structural problem in a bank definition
    /// (as opposed to a lookup miss)
    #[inline]
    #[must_use]
    pub fn is_definition_error(&self) -> bool {
        !matches!(self, Self::UnknownVersion(_))
    }
}

impl From<serde_yaml::Error> for BankError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for BankError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
