//! Name-keyed overrides for message options.
//!
//! Typed setters on [`MessageBuilder`](crate::MessageBuilder) cover the common
//! options. `set_option` reaches every field by its wire key, decoding the JSON
//! value into the field's type:
//!
//! ```
//! use mandrill_mailer::MessageConfiguration;
//! use serde_json::json;
//!
//! let mut message = MessageConfiguration::new();
//! message.set_option("track_opens", json!(true)).unwrap();
//! message.set_option("tags", json!(["password-reset"])).unwrap();
//!
//! assert!(message.set_option("trak_opens", json!(true)).is_err());
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MailError;
use crate::message::MessageConfiguration;

/// Every key accepted by [`MessageConfiguration::set_option`].
pub const OPTION_KEYS: &[&str] = &[
    "html",
    "text",
    "subject",
    "from_email",
    "from_name",
    "to",
    "headers",
    "important",
    "track_opens",
    "track_clicks",
    "auto_text",
    "auto_html",
    "inline_css",
    "url_strip_qs",
    "preserve_recipients",
    "view_content_link",
    "bcc_address",
    "tracking_domain",
    "signing_domain",
    "return_path_domain",
    "merge",
    "merge_language",
    "global_merge_vars",
    "merge_vars",
    "tags",
    "google_analytics_domains",
    "google_analytics_campaign",
    "metadata",
    "recipient_metadata",
    "attachments",
    "images",
];

impl MessageConfiguration {
    /// Override a field by its wire key.
    ///
    /// Fails with [`MailError::InvalidOption`] if the key is unknown or the
    /// value does not fit the field; the field is left unchanged in both cases.
    /// `null` clears optional fields.
    pub fn set_option(&mut self, key: &str, value: Value) -> Result<(), MailError> {
        match key {
            "html" => self.html = decode(key, value)?,
            "text" => self.text = decode(key, value)?,
            "subject" => self.subject = decode(key, value)?,
            "from_email" => self.from_email = decode(key, value)?,
            "from_name" => self.from_name = decode(key, value)?,
            "to" => self.to = decode(key, value)?,
            "headers" => self.headers = decode(key, value)?,
            "important" => self.important = decode(key, value)?,
            "track_opens" => self.track_opens = decode(key, value)?,
            "track_clicks" => self.track_clicks = decode(key, value)?,
            "auto_text" => self.auto_text = decode(key, value)?,
            "auto_html" => self.auto_html = decode(key, value)?,
            "inline_css" => self.inline_css = decode(key, value)?,
            "url_strip_qs" => self.url_strip_qs = decode(key, value)?,
            "preserve_recipients" => self.preserve_recipients = decode(key, value)?,
            "view_content_link" => self.view_content_link = decode(key, value)?,
            "bcc_address" => self.bcc_address = decode(key, value)?,
            "tracking_domain" => self.tracking_domain = decode(key, value)?,
            "signing_domain" => self.signing_domain = decode(key, value)?,
            "return_path_domain" => self.return_path_domain = decode(key, value)?,
            "merge" => self.merge = decode(key, value)?,
            "merge_language" => self.merge_language = decode(key, value)?,
            "global_merge_vars" => self.global_merge_vars = decode(key, value)?,
            "merge_vars" => self.merge_vars = decode(key, value)?,
            "tags" => self.tags = decode(key, value)?,
            "google_analytics_domains" => self.google_analytics_domains = decode(key, value)?,
            "google_analytics_campaign" => self.google_analytics_campaign = decode(key, value)?,
            "metadata" => self.metadata = decode(key, value)?,
            "recipient_metadata" => self.recipient_metadata = decode(key, value)?,
            "attachments" => self.attachments = decode(key, value)?,
            "images" => self.images = decode(key, value)?,
            _ => {
                return Err(MailError::InvalidOption(format!(
                    "unknown option '{}'",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, MailError> {
    serde_json::from_value(value)
        .map_err(|e| MailError::InvalidOption(format!("'{}': {}", key, e)))
}
