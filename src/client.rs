//! Delivery client trait and send result types.
//!
//! # Why `async_trait`?
//!
//! [`MessageBuilder`](crate::MessageBuilder) holds its client as
//! `Arc<dyn DeliveryClient>` so the same builder code can talk to Mandrill in
//! production and to [`LocalClient`](crate::providers::LocalClient) in tests.
//! Native async traits are not object-safe, so the trait goes through
//! `#[async_trait]`, which boxes each returned future. Sending is network
//! bound and the allocation does not show up.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::message::{MessageConfiguration, TemplateContent};
use crate::send_mode::SendMode;

/// Per-recipient outcome reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Queued,
    Scheduled,
    Rejected,
    Invalid,
    /// Any status this crate does not know about yet
    #[serde(other)]
    Unknown,
}

/// Status record for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStatus {
    pub email: String,
    pub status: DeliveryStatus,
    /// Why the recipient was rejected (e.g. `hard-bounce`, `unsigned`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    /// Message ID assigned by the service
    #[serde(rename = "_id", default)]
    pub id: String,
}

impl RecipientStatus {
    pub fn new(email: impl Into<String>, status: DeliveryStatus, id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status,
            reject_reason: None,
            id: id.into(),
        }
    }

    /// Sent, queued, or scheduled.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self.status,
            DeliveryStatus::Sent | DeliveryStatus::Queued | DeliveryStatus::Scheduled
        )
    }
}

/// Result of a successful send call: one status per recipient.
///
/// With async sending every entry is typically `queued`, which only means the
/// service accepted the message for later processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SendResult {
    pub recipients: Vec<RecipientStatus>,
}

impl SendResult {
    pub fn new(recipients: Vec<RecipientStatus>) -> Self {
        Self { recipients }
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Check whether every recipient was accepted.
    pub fn all_accepted(&self) -> bool {
        self.recipients.iter().all(RecipientStatus::is_accepted)
    }

    /// Recipients that were rejected or invalid.
    pub fn rejected(&self) -> Vec<&RecipientStatus> {
        self.recipients.iter().filter(|r| !r.is_accepted()).collect()
    }

    /// Status for a recipient email.
    pub fn status_for(&self, email: &str) -> Option<&RecipientStatus> {
        self.recipients.iter().find(|r| r.email == email)
    }
}

/// The external delivery service.
///
/// [`MandrillClient`](crate::providers::MandrillClient) talks to the Mandrill
/// API; [`LocalClient`](crate::providers::LocalClient) stands in for it during
/// development and tests. Implement this trait to plug in anything else.
///
/// # Example
///
/// ```ignore
/// use mandrill_mailer::{DeliveryClient, MessageConfiguration, SendMode};
/// use mandrill_mailer::providers::MandrillClient;
///
/// let client = MandrillClient::new(api_key);
/// let result = client.send_message(&message, &SendMode::new()).await?;
/// ```
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Send a message built from its own content.
    async fn send_message(
        &self,
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError>;

    /// Send a message using a stored template.
    ///
    /// `template_content` replaces editable regions of the template and may be
    /// empty when the template only uses merge variables.
    async fn send_template(
        &self,
        template_name: &str,
        template_content: &[TemplateContent],
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError>;

    /// Get the provider name (for logging/debugging).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}
