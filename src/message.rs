//! The Mandrill `message` object.
//!
//! Field names are the Mandrill wire keys, so a [`MessageConfiguration`]
//! serializes directly into the `message` member of a send request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::attachment::EncodedFile;

/// Recipient header type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    #[default]
    To,
    Cc,
    Bcc,
}

/// A single recipient in the `to` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    /// Display name (empty when not given)
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RecipientType,
}

impl Recipient {
    /// Create a `to` recipient with no display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: String::new(),
            kind: RecipientType::To,
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the recipient type.
    pub fn kind(mut self, kind: RecipientType) -> Self {
        self.kind = kind;
        self
    }
}

/// A merge variable (`{name, content}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeVar {
    pub name: String,
    pub content: Value,
}

impl MergeVar {
    pub fn new(name: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Merge variables for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientMergeVars {
    /// Recipient email the variables apply to
    pub rcpt: String,
    pub vars: Vec<MergeVar>,
}

/// Metadata for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientMetadata {
    pub rcpt: String,
    pub values: Map<String, Value>,
}

/// Content block that replaces an editable region of a stored template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateContent {
    pub name: String,
    pub content: String,
}

impl TemplateContent {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Merge tag syntax used in message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeLanguage {
    /// `*|VAR|*` tags
    #[default]
    Mailchimp,
    /// `{{var}}` tags
    Handlebars,
}

/// All per-message options.
///
/// Usually populated through [`MessageBuilder`](crate::MessageBuilder), but
/// the fields are public for inspection and direct construction.
///
/// Unset options and empty lists are left out of the serialized request,
/// except `to`, which is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageConfiguration {
    /// HTML body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Plain text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    /// Recipients in send order
    #[serde(default)]
    pub to: Vec<Recipient>,
    /// Extra headers (e.g. `Reply-To`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub important: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_html: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_strip_qs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_recipients: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_content_link: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_path_domain: Option<String>,
    /// Whether to evaluate merge tags
    #[serde(default = "default_merge")]
    pub merge: bool,
    #[serde(default)]
    pub merge_language: MergeLanguage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_merge_vars: Vec<MergeVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge_vars: Vec<RecipientMergeVars>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub google_analytics_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_analytics_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipient_metadata: Vec<RecipientMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EncodedFile>,
    /// Inline images, referenced from HTML as `cid:<name>`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<EncodedFile>,
}

fn default_merge() -> bool {
    true
}

impl Default for MessageConfiguration {
    fn default() -> Self {
        Self {
            html: None,
            text: None,
            subject: None,
            from_email: None,
            from_name: None,
            to: Vec::new(),
            headers: BTreeMap::new(),
            important: false,
            track_opens: None,
            track_clicks: None,
            auto_text: None,
            auto_html: None,
            inline_css: None,
            url_strip_qs: None,
            preserve_recipients: None,
            view_content_link: None,
            bcc_address: None,
            tracking_domain: None,
            signing_domain: None,
            return_path_domain: None,
            merge: default_merge(),
            merge_language: MergeLanguage::default(),
            global_merge_vars: Vec::new(),
            merge_vars: Vec::new(),
            tags: Vec::new(),
            google_analytics_domains: Vec::new(),
            google_analytics_campaign: None,
            metadata: Map::new(),
            recipient_metadata: Vec::new(),
            attachments: Vec::new(),
            images: Vec::new(),
        }
    }
}

impl MessageConfiguration {
    /// Create a message with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender as `(email, name)`, if one has been set.
    pub fn sender(&self) -> Option<(&str, &str)> {
        self.from_email
            .as_deref()
            .map(|email| (email, self.from_name.as_deref().unwrap_or("")))
    }

    /// Check whether at least one `to` recipient is present.
    pub fn has_primary_recipient(&self) -> bool {
        self.to.iter().any(|r| r.kind == RecipientType::To)
    }

    /// Recipients of the given type, in send order.
    pub fn recipients_of(&self, kind: RecipientType) -> Vec<&Recipient> {
        self.to.iter().filter(|r| r.kind == kind).collect()
    }
}
