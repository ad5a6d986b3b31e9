//! Assessment service
//!
//! The orchestrator behind every HTTP route and CLI command:
//! - Validates the parent form and answers
//! - Scores answers against the requested bank
//! - Assembles the report and stores the assessment record
//! - Renders and delivers the summary and PDF emails

use crate::config::{ServiceConfig, SinkKind};
use crate::error::{ServiceError, SinkError};
use crate::mailer::{BrevoMailer, DeliveryReceipt, EmailMessage, LogMailer, Mailer};
use crate::record::{AssessmentRecord, DeviceInfo, EmailPreferences, DIRECT_REFERRAL, SOURCE};
use crate::session::{ConversionEvent, SessionId, TimedAnswer};
use crate::sink::{DocumentSink, FirestoreSink, JsonLinesSink, MemorySink};
use crate::validate::{is_attachment_address, validate_email, validate_form, FormData};
use chrono::{DateTime, NaiveDate, Utc};
use lpa_bank::{BankRegistry, QuestionBank};
use lpa_report::{
    pdf_subject, render_pdf_cover_email, render_summary_email, summary_subject, CatalogSet,
    ContentLibrary, RenderCache, Report, ReportInput, StylePercentiles, FALLBACK_CHILD,
    FALLBACK_STYLE,
};
use lpa_scoring::{Answer, Evaluation, Percentile, Profile, StrategyRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Tags on the summary email
pub const SUMMARY_TAGS: [&str; 2] = ["assessment-report", "meta-campaign"];

/// Tags on the PDF email
pub const PDF_TAGS: [&str; 2] = ["assessment-pdf", "meta-campaign"];

/// A completed quiz, as posted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Parent form
    #[serde(flatten)]
    pub form: FormData,
    /// Bank the answers belong to; the configured default when absent
    #[serde(default)]
    pub bank_version: Option<String>,
    /// Selected options with timestamps
    pub answers: Vec<TimedAnswer>,
    /// `utm_source` of the landing visit
    #[serde(default)]
    pub referral_source: Option<String>,
    /// Session from the client; a new one when absent
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// When the quiz started
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Funnel events recorded by the client
    #[serde(default)]
    pub conversion_events: Vec<ConversionEvent>,
    /// Browser details
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
}

/// Result of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// Quiz session
    pub session_id: SessionId,
    /// Bank that scored the answers
    pub bank_version: String,
    /// Resolved profile
    pub profile: Profile,
    /// Raw trait totals
    pub scores: BTreeMap<String, f64>,
    /// Personalized report
    pub report: Report,
    /// Whether the record reached the sink
    pub stored: bool,
    /// Sink id of the stored record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

/// Request for the summary email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReportRequest {
    /// Recipient address
    pub email: String,
    /// Child's name
    #[serde(default)]
    pub child_name: String,
    /// Child's age
    #[serde(default)]
    pub child_age: Option<String>,
    /// Bank the answers belong to
    #[serde(default)]
    pub bank_version: Option<String>,
    /// Selected options
    pub answers: Vec<Answer>,
}

/// Reply to a summary email request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReportResponse {
    /// Always true on success
    pub success: bool,
    /// Status message
    pub message: String,
    /// Provider message id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Profile part of client-supplied report data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDataProfile {
    /// Primary style (`visual`, `kinesthetic`, ...)
    #[serde(default)]
    pub primary_domain: Option<String>,
    /// Headline percentile
    #[serde(default)]
    pub percentile: Option<u8>,
    /// Profile title
    #[serde(default)]
    pub title: Option<String>,
    /// Note for the parent
    #[serde(default)]
    pub clinical_note: Option<String>,
}

/// Chart percentiles in client-supplied report data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDataPercentiles {
    /// Visual bar
    #[serde(default)]
    pub visual: Option<u8>,
    /// Kinesthetic bar
    #[serde(default)]
    pub kinesthetic: Option<u8>,
    /// Auditory bar
    #[serde(default)]
    pub auditory: Option<u8>,
    /// Reading/writing bar
    #[serde(default)]
    pub text: Option<u8>,
}

/// Report data computed by the client
///
/// Every field is optional; missing values use the report defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// Resolved profile
    #[serde(default)]
    pub profile: Option<ReportDataProfile>,
    /// Chart percentiles
    #[serde(default)]
    pub percentiles: Option<ReportDataPercentiles>,
    /// Raw trait totals
    #[serde(default)]
    pub scores: Option<BTreeMap<String, f64>>,
    /// Form as the client holds it
    #[serde(default)]
    pub form_data: Option<serde_json::Value>,
    /// Child's name
    #[serde(default)]
    pub child_name: Option<String>,
}

impl ReportData {
    /// Render input for this data
    #[must_use]
    pub fn to_input(&self, child_name: &str, generated_on: NaiveDate) -> ReportInput {
        let profile = self.profile.clone().unwrap_or_default();
        let style = profile
            .primary_domain
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_STYLE.to_string());

        let mut input = ReportInput::new(child_name, style.to_lowercase(), generated_on);
        if let Some(value) = profile.percentile {
            input = input.with_percentile(Percentile::new(value));
        }
        if let Some(given) = self.percentiles {
            let defaults = StylePercentiles::default();
            let pick = |v: Option<u8>, d: Percentile| v.map_or(d, Percentile::new);
            input = input.with_percentiles(StylePercentiles {
                visual: pick(given.visual, defaults.visual),
                kinesthetic: pick(given.kinesthetic, defaults.kinesthetic),
                auditory: pick(given.auditory, defaults.auditory),
                text: pick(given.text, defaults.text),
            });
        }
        input
    }
}

/// Request for the PDF email
///
/// With `answers` the report is scored server-side; otherwise
/// `report_data` (or the defaults) drive the PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfReportRequest {
    /// Recipient address
    pub email: String,
    /// Child's name
    #[serde(default)]
    pub child_name: String,
    /// Bank the answers belong to
    #[serde(default)]
    pub bank_version: Option<String>,
    /// Answers to score on the server
    #[serde(default)]
    pub answers: Option<Vec<Answer>>,
    /// Client-computed report data
    #[serde(default)]
    pub report_data: Option<ReportData>,
}

/// Reply to a PDF email request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfReportResponse {
    /// Always true on success
    pub success: bool,
    /// Provider message id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// The assessment orchestrator
pub struct AssessmentService {
    config: ServiceConfig,
    banks: BankRegistry,
    strategies: StrategyRegistry,
    catalogs: CatalogSet,
    content: ContentLibrary,
    renders: RenderCache,
    sink: Arc<dyn DocumentSink>,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for AssessmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentService")
            .field("banks", &self.banks.versions())
            .field("catalogs", &self.catalogs.versions())
            .field("sink", &self.sink.name())
            .finish_non_exhaustive()
    }
}

impl AssessmentService {
    /// Create service with the built-in banks, catalogs and content
    ///
    /// # Errors
    /// Returns an error if built-in data fails to load or the default bank
    /// is not registered
    pub fn new(
        config: ServiceConfig,
        sink: Arc<dyn DocumentSink>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, ServiceError> {
        let banks = BankRegistry::with_builtin()?;
        let catalogs = CatalogSet::with_builtin()?;
        if !banks.contains(&config.default_bank) {
            return Err(ServiceError::Config(format!(
                "default bank `{}` is not registered",
                config.default_bank
            )));
        }
        for bank in banks.iter() {
            for key in catalogs.get(&bank.version)?.validate(bank) {
                tracing::warn!(bank = %bank.version, key = %key, "report key falls back to default");
            }
        }

        let renders = match config.cache.ttl() {
            Some(ttl) => RenderCache::with_ttl(config.cache.capacity, ttl),
            None => RenderCache::new(config.cache.capacity),
        };

        Ok(Self {
            banks,
            strategies: StrategyRegistry::with_defaults(),
            catalogs,
            content: ContentLibrary::builtin()?,
            renders,
            sink,
            mailer,
            config,
        })
    }

    /// Create service with the sink and mailer the configuration names
    ///
    /// Without a Brevo key, mail is logged rather than sent.
    ///
    /// # Errors
    /// Returns an error if a backend cannot be configured or built-in data
    /// fails to load
    pub fn from_config(config: ServiceConfig) -> Result<Self, ServiceError> {
        let sink: Arc<dyn DocumentSink> = match config.sink.kind {
            SinkKind::Memory => Arc::new(MemorySink::new()),
            SinkKind::Jsonl => Arc::new(JsonLinesSink::new(config.sink.path.clone())),
            SinkKind::Firestore => Arc::new(
                FirestoreSink::new(config.sink.project_id.clone(), config.sink.api_key.clone())?
                    .with_timeout(Duration::from_secs(config.sink.timeout_secs)),
            ),
        };

        let mailer: Arc<dyn Mailer> = if config.mail.api_key.is_some() {
            Arc::new(BrevoMailer::new(&config.mail)?)
        } else {
            tracing::warn!("BREVO_API_KEY not set, emails will only be logged");
            Arc::new(LogMailer::new())
        };

        tracing::info!(sink = sink.name(), "assessment service configured");
        Self::new(config, sink, mailer)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Registered banks
    #[inline]
    #[must_use]
    pub fn banks(&self) -> &BankRegistry {
        &self.banks
    }

    /// Bank by version, the default when `None`
    ///
    /// # Errors
    /// Returns [`ServiceError::Bank`] for an unknown version
    pub fn bank(&self, version: Option<&str>) -> Result<Arc<QuestionBank>, ServiceError> {
        let version = version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&self.config.default_bank);
        Ok(self.banks.get(version)?)
    }

    /// Score answers against a bank
    ///
    /// # Errors
    /// Returns [`ServiceError::Validation`] when a question is answered
    /// twice, or the bank/scoring error
    pub fn evaluate(
        &self,
        version: Option<&str>,
        answers: &[Answer],
    ) -> Result<(Arc<QuestionBank>, Evaluation), ServiceError> {
        let bank = self.bank(version)?;
        let mut seen = HashSet::with_capacity(answers.len());
        if let Some(dup) = answers.iter().find(|a| !seen.insert(a.question)) {
            return Err(ServiceError::Validation(format!(
                "question {} answered more than once",
                dup.question
            )));
        }
        let evaluation = self.strategies.evaluate(&bank, answers)?;
        Ok((bank, evaluation))
    }

    /// Report for a profile scored against a bank
    ///
    /// # Errors
    /// Returns [`ServiceError::Report`] when the bank has no catalog
    pub fn report(
        &self,
        bank: &QuestionBank,
        profile: &Profile,
        child_name: &str,
    ) -> Result<Report, ServiceError> {
        let catalog = self.catalogs.get(&bank.version)?;
        Ok(Report::assemble(profile, &catalog, child_name))
    }

    /// Rendered PDF for an input, cached
    ///
    /// # Errors
    /// Returns [`ServiceError::Report`] if the input cannot be hashed
    pub async fn render_pdf(&self, input: &ReportInput) -> Result<Arc<Vec<u8>>, ServiceError> {
        Ok(self.renders.pdf(input, &self.content).await?)
    }

    /// Score a completed quiz and store the record
    ///
    /// # Workflow
    /// 1. Validate the form and answers
    /// 2. Score against the requested bank
    /// 3. Assemble the report
    /// 4. Append the record; a sink failure is logged and reported as
    ///    `stored = false`
    ///
    /// # Errors
    /// Returns validation, bank or report errors; never a sink error
    pub async fn submit(&self, submission: Submission) -> Result<SubmissionOutcome, ServiceError> {
        let finished = Utc::now();

        // 1. Validate
        validate_form(&submission.form)?;
        let answers: Vec<Answer> = submission.answers.iter().map(TimedAnswer::answer).collect();

        // 2. Score
        let (bank, evaluation) = self.evaluate(submission.bank_version.as_deref(), &answers)?;
        let Evaluation { sheet, profile } = evaluation;
        let scores = sheet.to_map();

        // 3. Report
        let child_name = submission.form.child_name.trim().to_string();
        let report = self.report(&bank, &profile, &child_name)?;

        // 4. Store
        let session_id = submission.session_id.unwrap_or_default();
        let started = submission
            .started_at
            .unwrap_or_else(|| session_id.started_at());
        let record = AssessmentRecord {
            child_name,
            child_age: submission.form.child_age.trim().to_string(),
            parent_email: submission.form.parent_email.trim().to_string(),
            answers: submission.answers,
            scores: scores.clone(),
            primary_learning_style: profile.primary.clone(),
            secondary_learning_style: profile.secondary.clone(),
            neurodivergent_traits: report.signals.clone(),
            strengths: report.observed_strengths.clone(),
            urgency_level: profile.urgency,
            timestamp: finished,
            referral_source: submission
                .referral_source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DIRECT_REFERRAL.to_string()),
            source: SOURCE.to_string(),
            has_tried_app: false,
            signed_up_for_trial: false,
            conversion_events: submission.conversion_events,
            email_preferences: EmailPreferences::for_signals(profile.has_signals()),
            session_id,
            completion_time_seconds: AssessmentRecord::elapsed_seconds(started, finished),
            device_info: submission.device_info,
            bank_version: bank.version.clone(),
            bank_fingerprint: bank.fingerprint(),
        };

        let collection = &self.config.sink.collection;
        let stored: Result<String, SinkError> = match record.to_document() {
            Ok(document) => self.sink.append(collection, &document).await,
            Err(e) => Err(e.into()),
        };
        let record_id = match stored {
            Ok(id) => {
                tracing::info!(
                    session = %session_id,
                    bank = %bank.version,
                    primary = %profile.primary,
                    id = %id,
                    "stored assessment"
                );
                Some(id)
            }
            Err(e) => {
                tracing::warn!(session = %session_id, sink = self.sink.name(), "failed to store assessment: {}", e);
                None
            }
        };

        Ok(SubmissionOutcome {
            session_id,
            bank_version: bank.version.clone(),
            profile,
            scores,
            report,
            stored: record_id.is_some(),
            record_id,
        })
    }

    /// Score answers and email the summary report
    ///
    /// # Errors
    /// Returns [`ServiceError::Validation`] for a bad address, scoring
    /// errors, or [`ServiceError::Delivery`] when the provider fails
    pub async fn send_report(
        &self,
        request: SendReportRequest,
    ) -> Result<SendReportResponse, ServiceError> {
        let email = request.email.trim();
        if let Some(error) = validate_email(email).error {
            return Err(ServiceError::Validation(error));
        }

        let (bank, evaluation) = self.evaluate(request.bank_version.as_deref(), &request.answers)?;
        let child = display_child(&request.child_name);
        let report = self.report(&bank, &evaluation.profile, &child)?;

        let message = EmailMessage::new(email, summary_subject(&child), render_summary_email(&child, &report))
            .with_tags(SUMMARY_TAGS);
        let receipt = self.deliver(message).await?;

        Ok(SendReportResponse {
            success: true,
            message: "Email sent successfully".to_string(),
            message_id: receipt.message_id,
        })
    }

    /// Render the PDF report and email it as an attachment
    ///
    /// # Errors
    /// Returns [`ServiceError::Validation`] when the address fails the
    /// stricter attachment check, scoring errors, or
    /// [`ServiceError::Delivery`] when the provider fails
    pub async fn send_pdf_report(
        &self,
        request: PdfReportRequest,
    ) -> Result<PdfReportResponse, ServiceError> {
        let email = request.email.trim();
        if !is_attachment_address(email) {
            return Err(ServiceError::Validation(format!("Invalid email format: {email}")));
        }

        let name = if request.child_name.trim().is_empty() {
            request
                .report_data
                .as_ref()
                .and_then(|d| d.child_name.clone())
                .unwrap_or_default()
        } else {
            request.child_name.clone()
        };
        let today = Utc::now().date_naive();

        let input = match &request.answers {
            Some(answers) => {
                let (_, evaluation) = self.evaluate(request.bank_version.as_deref(), answers)?;
                ReportInput::from_profile(&evaluation.profile, &name, today)
            }
            None => request
                .report_data
                .clone()
                .unwrap_or_default()
                .to_input(&name, today),
        };

        let child = input.display_name();
        let pdf = self.render_pdf(&input).await?;
        let content = self.content.get(&input.primary_style).personalized(&child);
        let html = render_pdf_cover_email(&child, &content, input.percentile.unwrap_or_default());

        let message = EmailMessage::new(email, pdf_subject(&child), html)
            .with_tags(PDF_TAGS)
            .with_attachment(format!("{child}_Learning_Assessment.pdf"), pdf.to_vec());
        let receipt = self.deliver(message).await?;

        Ok(PdfReportResponse {
            success: true,
            message_id: receipt.message_id,
        })
    }

    async fn deliver(&self, message: EmailMessage) -> Result<DeliveryReceipt, ServiceError> {
        let to = message.to.clone();
        match self.mailer.send(message).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                tracing::error!(to = %to, retryable = e.is_retryable(), "email delivery failed: {}", e);
                Err(e.into())
            }
        }
    }
}

fn display_child(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        FALLBACK_CHILD.to_string()
    } else {
        name.to_string()
    }
}
