//! Stored assessment documents

use crate::session::{ConversionEvent, SessionId, TimedAnswer};
use chrono::{DateTime, Utc};
use lpa_bank::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Referral source when the parent arrived without a `utm_source`
pub const DIRECT_REFERRAL: &str = "direct";

/// Origin stamped on every record
pub const SOURCE: &str = "microsite";

/// Which emails the parent will receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPreferences {
    /// Weekly learning tips
    pub weekly_tips: bool,
    /// Product news
    pub product_updates: bool,
    /// On only when a neurodivergent signal was raised
    pub urgent_concerns: bool,
}

impl EmailPreferences {
    /// Defaults for a new record
    #[must_use]
    pub fn for_signals(has_signals: bool) -> Self {
        Self {
            weekly_tips: true,
            product_updates: true,
            urgent_concerns: has_signals,
        }
    }
}

/// Browser details reported by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Browser user agent
    #[serde(default)]
    pub user_agent: String,
    /// `WIDTHxHEIGHT`
    #[serde(default)]
    pub screen_size: String,
    /// Touch device
    #[serde(default)]
    pub is_mobile: bool,
}

/// One completed assessment, as written to the document sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    /// Child's name as entered
    pub child_name: String,
    /// Child's age as entered
    pub child_age: String,
    /// Parent's email
    pub parent_email: String,
    /// Answers in the order given
    pub answers: Vec<TimedAnswer>,
    /// Raw trait totals
    pub scores: BTreeMap<String, f64>,
    /// Primary trait
    pub primary_learning_style: String,
    /// Runner-up trait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_learning_style: Option<String>,
    /// Signal labels
    pub neurodivergent_traits: Vec<String>,
    /// Strength labels
    pub strengths: Vec<String>,
    /// Follow-up urgency, 1 to 10
    pub urgency_level: u8,
    /// When the record was built
    pub timestamp: DateTime<Utc>,
    /// Referral source, `direct` when unknown
    pub referral_source: String,
    /// Always `microsite`
    pub source: String,
    /// Whether the parent has tried the app
    pub has_tried_app: bool,
    /// Whether the parent signed up for a trial
    pub signed_up_for_trial: bool,
    /// Funnel events for this run
    pub conversion_events: Vec<ConversionEvent>,
    /// Opt-ins derived from the profile
    pub email_preferences: EmailPreferences,
    /// Quiz session
    pub session_id: SessionId,
    /// Seconds from start to submit
    pub completion_time_seconds: u64,
    /// Browser details, when sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    /// Bank the answers were scored against
    pub bank_version: String,
    /// Content hash of that bank
    pub bank_fingerprint: Fingerprint,
}

impl AssessmentRecord {
    /// Seconds between two instants, clamped at zero
    #[must_use]
    pub fn elapsed_seconds(started: DateTime<Utc>, finished: DateTime<Utc>) -> u64 {
        u64::try_from((finished - started).num_seconds()).unwrap_or(0)
    }

    /// Record as a JSON document
    ///
    /// # Errors
    /// Returns the encoding error
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_never_negative() {
        let now = Utc::now();
        assert_eq!(AssessmentRecord::elapsed_seconds(now, now + Duration::seconds(95)), 95);
        assert_eq!(AssessmentRecord::elapsed_seconds(now, now - Duration::seconds(5)), 0);
    }

    #[test]
    fn preferences_follow_signals() {
        assert!(EmailPreferences::for_signals(true).urgent_concerns);
        let quiet = EmailPreferences::for_signals(false);
        assert!(quiet.weekly_tips && quiet.product_updates && !quiet.urgent_concerns);
    }

    #[test]
    fn device_info_uses_client_field_names() {
        let info: DeviceInfo = serde_json::from_str(
            r#"{"userAgent":"Mozilla/5.0","screenSize":"390x844","isMobile":true}"#,
        )
        .unwrap();
        assert!(info.is_mobile);
        assert_eq!(info.screen_size, "390x844");
    }
}
