//! Local client for development and testing.
//!
//! Captures every request in memory instead of sending it, so tests can
//! assert on exactly what would have reached the service.
//!
//! # Testing Usage
//!
//! ```rust,ignore
//! use mandrill_mailer::MessageBuilder;
//! use mandrill_mailer::providers::LocalClient;
//!
//! #[tokio::test]
//! async fn test_sends_welcome_email() {
//!     let client = LocalClient::new();
//!     let mut builder = MessageBuilder::with_client(client.clone());
//!
//!     // Code under test
//!     send_welcome_email(&mut builder, "user@example.com").await;
//!
//!     assert!(client.sent_to("user@example.com"));
//!     assert!(client.template_sent("welcome"));
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::client::{DeliveryClient, SendResult};
use crate::error::MailError;
use crate::message::{MessageConfiguration, TemplateContent};
use crate::send_mode::SendMode;

/// Template part of a captured template send.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedTemplate {
    pub name: String,
    pub content: Vec<TemplateContent>,
}

/// A request as the client received it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Set for `send_template`, `None` for `send_message`
    pub template: Option<CapturedTemplate>,
    pub message: MessageConfiguration,
    pub send_mode: SendMode,
    /// When the request was captured
    pub captured_at: DateTime<Utc>,
}

impl CapturedRequest {
    /// Check whether this was a template send.
    pub fn is_template(&self) -> bool {
        self.template.is_some()
    }
}

#[derive(Debug, Default)]
struct LocalState {
    requests: RwLock<Vec<CapturedRequest>>,
    /// If set, sends fail with this message (for testing error paths).
    fail_with: RwLock<Option<String>>,
}

/// Client that stores requests in memory.
///
/// Clones share storage and failure state, so a test can hand one clone to a
/// [`MessageBuilder`](crate::MessageBuilder) and inspect through another.
#[derive(Debug, Clone, Default)]
pub struct LocalClient {
    state: Arc<LocalState>,
}

impl LocalClient {
    /// Create a new local client with empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Failure Simulation (for testing)
    // =========================================================================

    /// Make every send fail with a delivery error carrying `message`.
    ///
    /// ```rust,ignore
    /// let client = LocalClient::new();
    /// client.set_failure("quota exceeded");
    ///
    /// let err = builder.send().await.unwrap_err();
    /// assert_eq!(err.to_string(), "Delivery error: quota exceeded");
    /// ```
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.state.fail_with.write() = Some(message.into());
    }

    /// Clear the failure state.
    pub fn clear_failure(&self) {
        *self.state.fail_with.write() = None;
    }

    // =========================================================================
    // Request Access (for testing assertions)
    // =========================================================================

    /// All captured requests, oldest first.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.read().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.state.requests.read().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.read().len()
    }

    pub fn has_requests(&self) -> bool {
        self.request_count() > 0
    }

    /// Clear all captured requests.
    pub fn clear(&self) {
        self.state.requests.write().clear();
    }

    /// Remove and return all captured requests.
    pub fn flush(&self) -> Vec<CapturedRequest> {
        std::mem::take(&mut *self.state.requests.write())
    }

    // =========================================================================
    // Query Helpers (for testing)
    // =========================================================================

    /// Check if any request included a recipient address (any type).
    pub fn sent_to(&self, email: &str) -> bool {
        self.state.requests.read().iter().any(|request| {
            request
                .message
                .to
                .iter()
                .any(|r| r.email.eq_ignore_ascii_case(email))
        })
    }

    /// Check if a request with this exact subject was captured.
    pub fn sent_with_subject(&self, subject: &str) -> bool {
        self.state
            .requests
            .read()
            .iter()
            .any(|request| request.message.subject.as_deref() == Some(subject))
    }

    /// Check if a template send used this template name.
    pub fn template_sent(&self, name: &str) -> bool {
        self.state.requests.read().iter().any(|request| {
            request
                .template
                .as_ref()
                .is_some_and(|t| t.name == name)
        })
    }

    /// Find requests matching a predicate.
    pub fn find_requests<F>(&self, predicate: F) -> Vec<CapturedRequest>
    where
        F: Fn(&CapturedRequest) -> bool,
    {
        self.state
            .requests
            .read()
            .iter()
            .filter(|request| predicate(request))
            .cloned()
            .collect()
    }

    fn capture(
        &self,
        template: Option<CapturedTemplate>,
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError> {
        if let Some(ref reason) = *self.state.fail_with.read() {
            return Err(MailError::delivery(reason.clone()));
        }

        self.state.requests.write().push(CapturedRequest {
            template,
            message: message.clone(),
            send_mode: mode.clone(),
            captured_at: Utc::now(),
        });

        Ok(super::simulated_result(message, mode))
    }
}

#[async_trait]
impl DeliveryClient for LocalClient {
    async fn send_message(
        &self,
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError> {
        self.capture(None, message, mode)
    }

    async fn send_template(
        &self,
        template_name: &str,
        template_content: &[TemplateContent],
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError> {
        let template = CapturedTemplate {
            name: template_name.to_string(),
            content: template_content.to_vec(),
        };
        self.capture(Some(template), message, mode)
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}
