//! Outgoing email
//!
//! [`BrevoMailer`] talks to the Brevo transactional API; [`LogMailer`]
//! only records what would have been sent.

use crate::config::MailConfig;
use crate::error::DeliveryError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient
    pub name: String,
    /// Raw bytes, base64-encoded on send
    pub content: Vec<u8>,
}

/// A message ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Provider tags for campaign tracking
    pub tags: Vec<String>,
    /// Optional file attachment
    pub attachment: Option<Attachment>,
}

impl EmailMessage {
    /// Create message without attachment or tags
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            tags: Vec::new(),
            attachment: None,
        }
    }

    /// With provider tags
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// With an attachment
    #[must_use]
    pub fn with_attachment(mut self, name: impl Into<String>, content: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            name: name.into(),
            content,
        });
        self
    }
}

/// What the provider reported back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    /// Provider message id, when returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Mailer that sent it
    pub provider: String,
}

/// Email delivery
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message
    async fn send(&self, message: EmailMessage) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Brevo transactional email client
#[derive(Debug, Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    sender_name: String,
    sender_email: String,
    recipient_name: String,
}

impl BrevoMailer {
    /// Create mailer from settings
    ///
    /// # Errors
    /// Returns [`DeliveryError::Config`] without an API key
    pub fn new(config: &MailConfig) -> Result<Self, DeliveryError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DeliveryError::Config("BREVO_API_KEY is not set".to_string()))?;
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
            endpoint: config.endpoint.clone(),
            sender_name: config.sender_name.clone(),
            sender_email: config.sender_email.clone(),
            recipient_name: config.recipient_name.clone(),
        })
    }

    /// Request body for a message
    #[must_use]
    pub fn payload(&self, message: &EmailMessage) -> Value {
        let mut body = json!({
            "sender": { "name": self.sender_name, "email": self.sender_email },
            "to": [{ "email": message.to, "name": self.recipient_name }],
            "subject": message.subject,
            "htmlContent": message.html,
        });
        if !message.tags.is_empty() {
            body["tags"] = json!(message.tags);
        }
        if let Some(attachment) = &message.attachment {
            body["attachment"] = json!([{
                "name": attachment.name,
                "content": STANDARD.encode(&attachment.content),
            }]);
        }
        body
    }
}

#[async_trait::async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, message: EmailMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .header("api-key", &self.api_key)
            .json(&self.payload(&message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), to = %message.to, "brevo rejected message");
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Value = response.json().await.unwrap_or(Value::Null);
        let message_id = reply
            .get("messageId")
            .and_then(Value::as_str)
            .map(String::from);
        tracing::info!(to = %message.to, message_id = ?message_id, "email sent");
        Ok(DeliveryReceipt {
            message_id,
            provider: "brevo".to_string(),
        })
    }
}

/// Mailer that logs instead of sending
///
/// Keeps every message so tests and local runs can inspect them.
#[derive(Debug, Default)]
pub struct LogMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl LogMailer {
    /// Create new mailer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<DeliveryReceipt, DeliveryError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            attachment = message.attachment.as_ref().map(|a| a.name.as_str()),
            "email not sent (log mailer)"
        );
        let mut sent = self.sent.lock();
        sent.push(message);
        Ok(DeliveryReceipt {
            message_id: Some(format!("log-{}", sent.len())),
            provider: "log".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mailer() -> BrevoMailer {
        let config = MailConfig {
            api_key: Some("xkeysib-test".into()),
            ..MailConfig::default()
        };
        BrevoMailer::new(&config).unwrap()
    }

    #[test]
    fn requires_api_key() {
        assert!(matches!(
            BrevoMailer::new(&MailConfig::default()),
            Err(DeliveryError::Config(_))
        ));
    }

    #[test]
    fn payload_shape() {
        let message = EmailMessage::new("parent@example.com", "Results", "<p>hi</p>")
            .with_tags(["assessment-report", "meta-campaign"]);
        let body = mailer().payload(&message);
        assert_eq!(
            body,
            json!({
                "sender": { "name": "Vedyx Learning Assessment Team", "email": "connect@vedyx.ai" },
                "to": [{ "email": "parent@example.com", "name": "Parent" }],
                "subject": "Results",
                "htmlContent": "<p>hi</p>",
                "tags": ["assessment-report", "meta-campaign"],
            })
        );
    }

    #[test]
    fn attachment_is_base64() {
        let message = EmailMessage::new("p@example.com", "PDF", "")
            .with_attachment("Maya_Learning_Assessment.pdf", b"%PDF-1.4".to_vec());
        let body = mailer().payload(&message);
        assert_eq!(body["attachment"][0]["name"], "Maya_Learning_Assessment.pdf");
        assert_eq!(body["attachment"][0]["content"], "JVBERi0xLjQ=");
        assert!(body.get("tags").is_none());
    }

    #[tokio::test]
    async fn log_mailer_keeps_messages() {
        let mailer = LogMailer::new();
        let receipt = mailer
            .send(EmailMessage::new("p@example.com", "s", "h"))
            .await
            .unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("log-1"));
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn log_mailer_ids_count_up() {
        let mailer = LogMailer::new();
        let ids: Vec<_> = (0..3)
            .map(|_| {
                tokio_test::block_on(mailer.send(EmailMessage::new("p@example.com", "s", "h")))
                    .unwrap()
                    .message_id
            })
            .collect();
        assert_eq!(
            ids,
            vec![Some("log-1".into()), Some("log-2".into()), Some("log-3".into())]
        );
    }
}
