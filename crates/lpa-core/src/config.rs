//! Service configuration
//!
//! Loaded from TOML; every section has defaults so an empty file (or no
//! file) yields a working in-memory service. Secrets normally arrive
//! through the environment:
//!
//! | Variable               | Field                    |
//! |------------------------|--------------------------|
//! | `LPA_BIND`             | `bind`                   |
//! | `LPA_SINK`             | `sink.kind`              |
//! | `LPA_SINK_PATH`        | `sink.path`              |
//! | `FIRESTORE_PROJECT_ID` | `sink.project_id`        |
//! | `FIRESTORE_API_KEY`    | `sink.api_key`           |
//! | `BREVO_API_KEY`        | `mail.api_key`           |

use crate::error::ServiceError;
use lpa_bank::DEFAULT_VERSION;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where assessment records go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Kept in process memory
    #[default]
    Memory,
    /// One JSON document per line in a local file
    Jsonl,
    /// Firestore REST API
    Firestore,
}

impl std::str::FromStr for SinkKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "jsonl" | "file" => Ok(Self::Jsonl),
            "firestore" => Ok(Self::Firestore),
            other => Err(ServiceError::Config(format!("unknown sink kind: {other}"))),
        }
    }
}

/// Document sink settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Where records go
    pub kind: SinkKind,
    /// File for the `jsonl` sink
    pub path: PathBuf,
    /// Collection records are appended to
    pub collection: String,
    /// Firestore project
    pub project_id: String,
    /// Firestore web API key
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Memory,
            path: PathBuf::from("assessments.jsonl"),
            collection: "assessments".to_string(),
            project_id: "v-leap".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Outgoing email settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Brevo API key; without one mail is only logged
    pub api_key: Option<String>,
    /// Transactional email endpoint
    pub endpoint: String,
    /// Sender display name
    pub sender_name: String,
    /// Sender address
    pub sender_email: String,
    /// Name shown for every recipient
    pub recipient_name: String,
    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.brevo.com/v3/smtp/email".to_string(),
            sender_name: "Vedyx Learning Assessment Team".to_string(),
            sender_email: "connect@vedyx.ai".to_string(),
            recipient_name: "Parent".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Rendered PDF cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Most rendered PDFs kept
    pub capacity: u64,
    /// Zero keeps entries until evicted by size
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            ttl_secs: 3_600,
        }
    }
}

impl CacheConfig {
    /// Time to live, if any
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listen address
    pub bind: SocketAddr,
    /// Bank used when a request names none
    pub default_bank: String,
    /// Record storage
    pub sink: SinkConfig,
    /// Outgoing email
    pub mail: MailConfig,
    /// Rendered PDF cache
    pub cache: CacheConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            default_bank: DEFAULT_VERSION.to_string(),
            sink: SinkConfig::default(),
            mail: MailConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With default bank version
    #[inline]
    #[must_use]
    pub fn with_default_bank(mut self, version: impl Into<String>) -> Self {
        self.default_bank = version.into();
        self
    }

    /// With sink settings
    #[inline]
    #[must_use]
    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }

    /// With mail settings
    #[inline]
    #[must_use]
    pub fn with_mail(mut self, mail: MailConfig) -> Self {
        self.mail = mail;
        self
    }

    /// With render cache settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Parse TOML
    ///
    /// # Errors
    /// Returns [`ServiceError::Config`] on malformed input
    pub fn from_toml_str(source: &str) -> Result<Self, ServiceError> {
        toml::from_str(source).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Load from an optional file, then apply the process environment
    ///
    /// # Errors
    /// Returns [`ServiceError::Config`] if the file cannot be read or parsed,
    /// or an environment value is malformed
    pub fn load(path: Option<&Path>) -> Result<Self, ServiceError> {
        let mut config = match path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|e| {
                    ServiceError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&source)?
            }
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        tracing::debug!(
            bind = %config.bind,
            sink = ?config.sink.kind,
            mail = config.mail.api_key.is_some(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    ///
    /// # Errors
    /// Returns [`ServiceError::Config`] for a malformed address or sink kind
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("LPA_BIND") {
            self.bind = bind
                .parse()
                .map_err(|e| ServiceError::Config(format!("LPA_BIND: {e}")))?;
        }
        if let Some(kind) = get("LPA_SINK") {
            self.sink.kind = kind.parse()?;
        }
        if let Some(path) = get("LPA_SINK_PATH") {
            self.sink.path = PathBuf::from(path);
        }
        if let Some(project) = get("FIRESTORE_PROJECT_ID") {
            self.sink.project_id = project;
        }
        if let Some(key) = get("FIRESTORE_API_KEY") {
            self.sink.api_key = Some(key);
        }
        if let Some(key) = get("BREVO_API_KEY") {
            self.mail.api_key = Some(key);
        }
        Ok(())
    }
}
