//! Learning Profile Assessment: service core
//!
//! Ties banks, scoring and reports into the parent-facing service.
//!
//! # Core Concepts
//!
//! - [`QuizRun`]: the `Info -> Questions -> Results` flow with conversion
//!   events
//! - [`validate_form`] / [`validate_email`]: parent form checks
//! - [`AssessmentRecord`]: what is stored per completed quiz
//! - [`DocumentSink`]: memory, JSON lines or Firestore storage
//! - [`Mailer`]: Brevo delivery or logging
//! - [`AssessmentService`]: submit, send report, send PDF report
//!
//! # Example
//!
//! ```rust,ignore
//! use lpa_core::{AssessmentService, ServiceConfig};
//!
//! let service = AssessmentService::from_config(ServiceConfig::load(None)?)?;
//! let outcome = service.submit(submission).await?;
//! println!("{} (stored: {})", outcome.profile.primary, outcome.stored);
//! ```

#![warn(unreachable_pub)]

mod config;
mod error;
mod mailer;
mod record;
mod service;
mod session;
mod sink;
mod validate;

pub use config::{CacheConfig, MailConfig, ServiceConfig, SinkConfig, SinkKind};
pub use error::{DeliveryError, QuizError, ServiceError, SinkError};
pub use mailer::{Attachment, BrevoMailer, DeliveryReceipt, EmailMessage, LogMailer, Mailer};
pub use record::{AssessmentRecord, DeviceInfo, EmailPreferences, DIRECT_REFERRAL, SOURCE};
pub use service::{
    AssessmentService, PdfReportRequest, PdfReportResponse, ReportData, ReportDataPercentiles,
    ReportDataProfile, SendReportRequest, SendReportResponse, Submission, SubmissionOutcome,
    PDF_TAGS, SUMMARY_TAGS,
};
pub use session::{ConversionEvent, QuizRun, SessionId, Step, TimedAnswer};
pub use sink::{
    encode_document, encode_value, DocumentSink, FirestoreSink, JsonLinesSink, MemorySink,
    StoredLine,
};
pub use validate::{
    is_attachment_address, validate_email, validate_form, EmailCheck, FormData, FormErrors,
    MAX_AGE, MIN_AGE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
