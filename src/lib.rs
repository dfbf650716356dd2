//! # mandrill-mailer
//!
//! Build and send Mandrill transactional emails from Rust.
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! MANDRILL_API_KEY=md-xxxxx
//! MANDRILL_TEST_API_KEY=md-test-xxxxx
//! ```
//!
//! Build a message and send it:
//! ```rust,ignore
//! use mandrill_mailer::{ApiMode, MessageBuilder};
//!
//! let mut builder = MessageBuilder::from_env(ApiMode::Live)?;
//! builder
//!     .set_from("noreply@example.com", "My App")
//!     .add_to("user@example.com", "User")
//!     .set_subject("Welcome!")
//!     .set_body_text("Hello");
//!
//! let result = builder.send().await?;
//! assert!(result.all_accepted());
//! ```
//!
//! ## Templates
//!
//! ```rust,ignore
//! use mandrill_mailer::TemplateContent;
//!
//! builder.add_merge_vars("user@example.com", [("FNAME", "Bob")]);
//! builder
//!     .send_template("welcome", &[TemplateContent::new("header", "<h1>Hi</h1>")])
//!     .await?;
//! ```
//!
//! ## Testing
//!
//! Swap the client for [`LocalClient`](providers::LocalClient) to capture
//! requests instead of sending them:
//!
//! ```rust,ignore
//! use mandrill_mailer::MessageBuilder;
//! use mandrill_mailer::providers::LocalClient;
//!
//! let client = LocalClient::new();
//! let mut builder = MessageBuilder::with_client(client.clone());
//! // ...
//! assert!(client.sent_to("user@example.com"));
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `MANDRILL_API_KEY` | Live API key |
//! | `MANDRILL_TEST_API_KEY` | Test API key |
//! | `MANDRILL_BASE_URL` | API endpoint override (default: `https://mandrillapp.com/api/1.0`) |
//!
//! ## Feature Flags
//!
//! - `mandrill` (default) - HTTP client for the Mandrill API
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `mandrill_messages_total` | Counter | provider, kind, status | Send calls |
//! | `mandrill_send_duration_seconds` | Histogram | provider | Send duration |

/// The version of the mandrill-mailer crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod attachment;
mod builder;
mod client;
mod credentials;
mod error;
mod message;
mod option;
mod send_mode;

pub mod providers;

// Re-exports
pub use attachment::EncodedFile;
pub use builder::MessageBuilder;
pub use client::{DeliveryClient, DeliveryStatus, RecipientStatus, SendResult};
pub use credentials::{ApiMode, Credentials, API_KEY_ENV, TEST_API_KEY_ENV};
pub use error::MailError;
pub use message::{
    MergeLanguage, MergeVar, MessageConfiguration, Recipient, RecipientMergeVars,
    RecipientMetadata, RecipientType, TemplateContent,
};
pub use option::OPTION_KEYS;
pub use send_mode::{parse_send_at, SendMode, DEFAULT_IP_POOL, SEND_AT_FORMAT};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::ApiMode;
    pub use crate::Credentials;
    pub use crate::DeliveryClient;
    pub use crate::MailError;
    pub use crate::MessageBuilder;
    pub use crate::RecipientType;
    pub use crate::SendResult;
    pub use crate::TemplateContent;
}
