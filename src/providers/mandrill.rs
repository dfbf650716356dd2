//! Mandrill API client.
//!
//! # Example
//!
//! ```rust,ignore
//! use mandrill_mailer::providers::MandrillClient;
//!
//! let client = MandrillClient::new("md-xxxxxxxxxxxxxxxxxxxx");
//! ```
//!
//! Messages go to `messages/send.json`, template sends to
//! `messages/send-template.json`. Both endpoints answer with one status record
//! per recipient, or with an error object:
//!
//! ```json
//! {"status": "error", "code": -1, "name": "Invalid_Key", "message": "Invalid API key"}
//! ```
//!
//! which becomes [`MailError::Delivery`]. Nothing is retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::client::{DeliveryClient, RecipientStatus, SendResult};
use crate::error::MailError;
use crate::message::{MessageConfiguration, TemplateContent};
use crate::send_mode::SendMode;

const MANDRILL_API_URL: &str = "https://mandrillapp.com/api/1.0";

/// Mandrill API delivery client.
pub struct MandrillClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl MandrillClient {
    /// Create a new Mandrill client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: MANDRILL_API_URL.to_string(),
        }
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            client,
            base_url: MANDRILL_API_URL.to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post(&self, endpoint: &str, body: &impl Serialize) -> Result<SendResult, MailError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", format!("mandrill-mailer/{}", crate::VERSION))
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let recipients: Vec<RecipientStatus> = response.json().await?;
            Ok(SendResult::new(recipients))
        } else {
            let error: MandrillError = response.json().await.unwrap_or(MandrillError {
                name: "Unknown".to_string(),
                message: format!("Unknown error (HTTP {})", status.as_u16()),
            });
            Err(MailError::delivery_with_status(
                error.name,
                error.message,
                status.as_u16(),
            ))
        }
    }
}

#[async_trait]
impl DeliveryClient for MandrillClient {
    async fn send_message(
        &self,
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError> {
        let request = SendRequest {
            key: &self.api_key,
            message,
            mode,
        };
        self.post("messages/send.json", &request).await
    }

    async fn send_template(
        &self,
        template_name: &str,
        template_content: &[TemplateContent],
        message: &MessageConfiguration,
        mode: &SendMode,
    ) -> Result<SendResult, MailError> {
        let request = SendTemplateRequest {
            key: &self.api_key,
            template_name,
            template_content,
            message,
            mode,
        };
        self.post("messages/send-template.json", &request).await
    }

    fn provider_name(&self) -> &'static str {
        "mandrill"
    }
}

// ============================================================================
// Mandrill API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    key: &'a str,
    message: &'a MessageConfiguration,
    #[serde(flatten)]
    mode: &'a SendMode,
}

#[derive(Debug, Serialize)]
struct SendTemplateRequest<'a> {
    key: &'a str,
    template_name: &'a str,
    template_content: &'a [TemplateContent],
    message: &'a MessageConfiguration,
    #[serde(flatten)]
    mode: &'a SendMode,
}

#[derive(Debug, Deserialize)]
struct MandrillError {
    name: String,
    message: String,
}
