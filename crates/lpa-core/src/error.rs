//! Error types for the assessment service
//!
//! Classification helpers decide how the HTTP layer answers:
//! client errors become 400/404, delivery failures 502, the rest 500.

use crate::validate::FormErrors;
use lpa_bank::{BankError, OptionId};
use lpa_report::ReportError;
use lpa_scoring::ScoringError;

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request failed validation
    #[error("{0}")]
    Validation(String),

    /// Parent form failed validation
    #[error("invalid form: {0}")]
    Form(#[from] FormErrors),

    /// Bank lookup or definition failed
    #[error("bank error: {0}")]
    Bank(#[from] BankError),

    /// Profile resolution failed
    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Report data or rendering failed
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Email could not be delivered
    #[error("failed to send email: {0}")]
    Delivery(#[from] DeliveryError),

    /// Document storage failed
    #[error("storage error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    /// Check if the caller sent something wrong
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Form(_)) || self.is_not_found()
    }

    /// Check if a named resource does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Bank(BankError::UnknownVersion(_)) | Self::Report(ReportError::UnknownCatalog(_))
        )
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Delivery(e) => e.is_retryable(),
            Self::Sink(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Document sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Local file could not be written
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// Request never reached the store
    #[error("request failed: {0}")]
    Transport(String),

    /// Store answered with an error status
    #[error("store rejected document ({status}): {body}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },

    /// Sink is misconfigured
    #[error("sink misconfigured: {0}")]
    Config(String),
}

impl SinkError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io(_) | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Encode(_) | Self::Config(_) => false,
        }
    }
}

/// Mail delivery errors
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Request never reached the provider
    #[error("request failed: {0}")]
    Transport(String),

    /// Provider answered with an error status
    #[error("Brevo API Error: {status} - {body}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },

    /// Mailer is misconfigured
    #[error("mailer misconfigured: {0}")]
    Config(String),
}

impl DeliveryError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Quiz flow errors
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// Operation not allowed in the current step
    #[error("cannot {action} during the {step} step")]
    WrongStep {
        /// Attempted operation
        action: &'static str,
        /// Current step name
        step: &'static str,
    },

    /// Submit called before an option was selected
    #[error("no option selected")]
    NoSelection,

    /// Option does not belong to the current question
    #[error("option {0} is not offered by this question")]
    UnknownOption(OptionId),

    /// Back called on the first question
    #[error("already at the first question")]
    AtFirstQuestion,

    /// Parent form failed validation
    #[error("invalid form: {0}")]
    Form(#[from] FormErrors),
}
