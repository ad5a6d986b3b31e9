//! Error types for profile resolution

/// Scoring errors
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// No strategy registered under this name
    #[error("unknown resolution strategy `{0}`")]
    UnknownStrategy(String),

    /// Bank has no domain to resolve
    #[error("bank `{0}` declares no domains")]
    NoDomains(String),

    /// Strategy needs a domain the bank does not declare
    #[error("bank `{version}` has no domain `{domain}`")]
    MissingDomain {
        /// Bank version
        version: String,
        /// Missing domain key
        domain: String,
    },
}

impl ScoringError {
    /// Check if the error points at a misconfigured bank (as opposed to a
    /// bad request)
    #[inline]
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::NoDomains(_) | Self::MissingDomain { .. })
    }
}
