//! Error types for mandrill-mailer.

use thiserror::Error;

/// Errors that can occur when building or sending a message.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// Configuration error (missing API key for the requested mode, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown option name, or a value of the wrong type for that option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// `send_at` was not in `YYYY-MM-DD HH:MM:SS` form.
    #[error("Invalid send_at timestamp: {0}")]
    InvalidSendAt(String),

    /// Failed to read an image or attachment source.
    #[error("Failed to read resource: {0}")]
    ResourceRead(String),

    /// The delivery service rejected or failed to process the request.
    #[error("Delivery error: {message}")]
    Delivery {
        /// Error name reported by the service (e.g. `Invalid_Key`)
        name: Option<String>,
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl MailError {
    /// Create a delivery error with just a message.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            name: None,
            message: message.into(),
            status: None,
        }
    }

    /// Create a delivery error as reported by the Mandrill API.
    pub fn delivery_with_status(
        name: impl Into<String>,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::Delivery {
            name: Some(name.into()),
            message: message.into(),
            status: Some(status),
        }
    }

    /// Returns true if this error came from the delivery service.
    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}

#[cfg(feature = "mandrill")]
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
