//! Error types for report rendering

/// Report errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Catalog or content definition could not be parsed
    #[error("failed to parse report data: {0}")]
    Parse(String),

    /// Catalog lacks the mandatory `default` entry
    #[error("report catalog `{0}` has no `default` entry")]
    MissingDefault(String),

    /// No catalog for a bank version
    #[error("no report catalog for bank `{0}`")]
    UnknownCatalog(String),

    /// Render input could not be serialized for hashing
    #[error("failed to encode render input: {0}")]
    Encode(String),

    /// Profile content library lacks the fallback style
    #[error("profile content has no `{0}` entry")]
    MissingContent(String),
}

impl ReportError {
    /// Check if the error comes from embedded or loaded data rather than
    /// from the caller
    #[inline]
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::UnknownCatalog(_) | Self::Encode(_))
    }
}

impl From<serde_yaml::Error> for ReportError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
