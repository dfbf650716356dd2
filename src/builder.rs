//! Message builder and dispatch.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::attachment::EncodedFile;
use crate::client::{DeliveryClient, SendResult};
use crate::error::MailError;
use crate::message::{
    MergeLanguage, MergeVar, MessageConfiguration, Recipient, RecipientMergeVars, RecipientType,
    TemplateContent,
};
use crate::send_mode::SendMode;

#[cfg(feature = "mandrill")]
use crate::credentials::{ApiMode, Credentials};

/// Collects message options and sends them through a [`DeliveryClient`].
///
/// State is kept between sends: calling [`send`](Self::send) twice sends the
/// accumulated message twice, with any changes made in between.
///
/// ```rust,ignore
/// use mandrill_mailer::{ApiMode, Credentials, MessageBuilder};
///
/// let mut builder = MessageBuilder::new(&Credentials::from_env(), ApiMode::Live)?;
/// builder
///     .set_from("a@x.com", "A")
///     .add_to("b@y.com", "B")
///     .set_subject("Hi")
///     .set_body_text("hello");
///
/// let result = builder.send().await?;
/// ```
pub struct MessageBuilder {
    client: Arc<dyn DeliveryClient>,
    message: MessageConfiguration,
    send_mode: SendMode,
}

impl MessageBuilder {
    /// Create a builder that sends through the Mandrill API.
    ///
    /// Uses the key for `mode`; fails with [`MailError::Configuration`] if it
    /// is missing.
    #[cfg(feature = "mandrill")]
    pub fn new(credentials: &Credentials, mode: ApiMode) -> Result<Self, MailError> {
        let key = credentials.resolve(mode)?;
        tracing::debug!(mode = ?mode, "Creating Mandrill message builder");
        Ok(Self::with_client(crate::providers::MandrillClient::new(key)))
    }

    /// Create a Mandrill builder from `MANDRILL_API_KEY` / `MANDRILL_TEST_API_KEY`.
    ///
    /// `MANDRILL_BASE_URL`, if set, replaces the API endpoint.
    #[cfg(feature = "mandrill")]
    pub fn from_env(mode: ApiMode) -> Result<Self, MailError> {
        let credentials = Credentials::from_env();
        let key = credentials.resolve(mode)?;

        let mut client = crate::providers::MandrillClient::new(key);
        if let Ok(base_url) = std::env::var("MANDRILL_BASE_URL") {
            client = client.base_url(base_url);
        }
        Ok(Self::with_client(client))
    }

    /// Create a builder around any delivery client.
    pub fn with_client<C: DeliveryClient + 'static>(client: C) -> Self {
        Self::with_client_arc(Arc::new(client))
    }

    /// Create a builder around a shared delivery client.
    pub fn with_client_arc(client: Arc<dyn DeliveryClient>) -> Self {
        Self {
            client,
            message: MessageConfiguration::new(),
            send_mode: SendMode::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The message as it will be sent.
    pub fn message(&self) -> &MessageConfiguration {
        &self.message
    }

    /// Dispatch options as they will be sent.
    pub fn send_mode(&self) -> &SendMode {
        &self.send_mode
    }

    pub fn client(&self) -> &Arc<dyn DeliveryClient> {
        &self.client
    }

    // =========================================================================
    // Options and Send Mode
    // =========================================================================

    /// Override any message option by its Mandrill key.
    ///
    /// See [`MessageConfiguration::set_option`].
    pub fn set_option(
        &mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, MailError> {
        self.message.set_option(key, value.into())?;
        Ok(self)
    }

    /// Schedule delivery, as `YYYY-MM-DD HH:MM:SS` in UTC.
    ///
    /// A time in the past sends immediately.
    pub fn set_send_at(&mut self, timestamp: &str) -> Result<&mut Self, MailError> {
        self.send_mode.set_send_at(timestamp)?;
        Ok(self)
    }

    /// Schedule delivery at a UTC datetime.
    pub fn set_send_at_datetime(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.send_mode.set_send_at_datetime(at);
        self
    }

    /// Queue on the service instead of waiting for per-recipient results.
    ///
    /// Leave off if you need immediate notice of rejection or delivery.
    pub fn set_async(&mut self, flag: bool) -> &mut Self {
        self.send_mode.set_async(flag);
        self
    }

    /// Dedicated IP pool; `None` selects the default pool.
    pub fn set_ip_pool(&mut self, pool: Option<&str>) -> &mut Self {
        self.send_mode.set_ip_pool(pool);
        self
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Set the HTML body. Not escaped.
    pub fn set_body_html(&mut self, html: impl Into<String>) -> &mut Self {
        self.message.html = Some(html.into());
        self
    }

    /// Set the plain text body.
    pub fn set_body_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.message.text = Some(text.into());
        self
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.message.subject = Some(subject.into());
        self
    }

    /// Set the sender. Pass `""` for no display name.
    pub fn set_from(&mut self, email: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.message.from_email = Some(email.into());
        self.message.from_name = Some(name.into());
        self
    }

    /// Replace all headers with a single header.
    ///
    /// Earlier headers are discarded; use [`append_header`](Self::append_header)
    /// to keep them.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.message.headers = BTreeMap::from([(name.into(), value.into())]);
        self
    }

    /// Add a header, keeping the others. The last value for a name wins.
    pub fn append_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.message.headers.insert(name.into(), value.into());
        self
    }

    // =========================================================================
    // Recipients
    // =========================================================================

    /// Append a `to` recipient. Pass `""` for no display name.
    pub fn add_to(&mut self, email: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.add_recipient(email, name, RecipientType::To)
    }

    /// Append a `cc` recipient.
    pub fn add_cc(&mut self, email: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.add_recipient(email, name, RecipientType::Cc)
    }

    /// Append a `bcc` recipient.
    pub fn add_bcc(&mut self, email: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.add_recipient(email, name, RecipientType::Bcc)
    }

    /// Append a recipient of any type. Order is kept.
    pub fn add_recipient(
        &mut self,
        email: impl Into<String>,
        name: impl Into<String>,
        kind: RecipientType,
    ) -> &mut Self {
        self.message
            .to
            .push(Recipient::new(email).name(name).kind(kind));
        self
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    /// Attach raw content, base64-encoding it.
    pub fn add_attachment(
        &mut self,
        mime_type: impl Into<String>,
        name: impl Into<String>,
        content: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.message
            .attachments
            .push(EncodedFile::from_bytes(mime_type, name, content));
        self
    }

    /// Embed an image file, referenced from HTML as `cid:<name>`.
    ///
    /// The MIME type is taken from the file extension. Fails with
    /// [`MailError::ResourceRead`] if the file cannot be read.
    pub fn add_image(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<&mut Self, MailError> {
        let image = EncodedFile::from_path(name, path)?;
        self.message.images.push(image);
        Ok(self)
    }

    // =========================================================================
    // Merge Variables
    // =========================================================================

    /// Append a merge variable shared by all recipients.
    pub fn add_global_merge_var(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.message.global_merge_vars.push(MergeVar::new(name, value));
        self
    }

    /// Append merge variables for one recipient.
    ///
    /// ```rust,ignore
    /// builder.add_merge_vars("bob@example.com", [("FNAME", "Bob"), ("PLAN", "pro")]);
    /// ```
    pub fn add_merge_vars<I, K, V>(&mut self, recipient: impl Into<String>, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.message.merge_vars.push(RecipientMergeVars {
            rcpt: recipient.into(),
            vars: vars
                .into_iter()
                .map(|(name, value)| MergeVar::new(name, value))
                .collect(),
        });
        self
    }

    pub fn set_merge_language(&mut self, language: MergeLanguage) -> &mut Self {
        self.message.merge_language = language;
        self
    }

    // =========================================================================
    // Common Options
    // =========================================================================

    pub fn add_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.message.tags.push(tag.into());
        self
    }

    /// Set a metadata value, returned with webhook events.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.message.metadata.insert(key.into(), value.into());
        self
    }

    pub fn set_important(&mut self, important: bool) -> &mut Self {
        self.message.important = important;
        self
    }

    pub fn set_track_opens(&mut self, track: bool) -> &mut Self {
        self.message.track_opens = Some(track);
        self
    }

    pub fn set_track_clicks(&mut self, track: bool) -> &mut Self {
        self.message.track_clicks = Some(track);
        self
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Send the message.
    ///
    /// Returns one status per recipient, or [`MailError::Delivery`] if the
    /// service rejected the request. With async mode on, statuses are usually
    /// `queued`.
    pub async fn send(&self) -> Result<SendResult, MailError> {
        let provider = self.client.provider_name();
        let span = self.dispatch_span(provider, None);

        async {
            self.check_recipients();
            tracing::debug!("Sending message");

            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let result = self
                .client
                .send_message(&self.message, &self.send_mode)
                .await;

            #[cfg(feature = "metrics")]
            record_metrics(provider, "message", result.is_ok(), start);

            log_outcome(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Send the message using a stored template.
    ///
    /// `template_content` fills editable regions and may be empty when the
    /// template only uses merge variables.
    pub async fn send_template(
        &self,
        template_name: &str,
        template_content: &[TemplateContent],
    ) -> Result<SendResult, MailError> {
        let provider = self.client.provider_name();
        let span = self.dispatch_span(provider, Some(template_name));

        async {
            self.check_recipients();
            tracing::debug!(blocks = template_content.len(), "Sending template message");

            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let result = self
                .client
                .send_template(
                    template_name,
                    template_content,
                    &self.message,
                    &self.send_mode,
                )
                .await;

            #[cfg(feature = "metrics")]
            record_metrics(provider, "template", result.is_ok(), start);

            log_outcome(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Like [`send`](Self::send), but a failure is logged and yields `None`.
    ///
    /// Callers cannot tell a failed send from a skipped one; prefer `send`.
    pub async fn send_or_log(&self) -> Option<SendResult> {
        swallow(self.send().await)
    }

    /// Like [`send_template`](Self::send_template), but a failure is logged and yields `None`.
    pub async fn send_template_or_log(
        &self,
        template_name: &str,
        template_content: &[TemplateContent],
    ) -> Option<SendResult> {
        swallow(self.send_template(template_name, template_content).await)
    }

    fn dispatch_span(&self, provider: &'static str, template: Option<&str>) -> tracing::Span {
        let to = self.message.to.iter().map(|r| &r.email).collect::<Vec<_>>();
        match template {
            Some(template) => tracing::info_span!(
                "mandrill.send_template",
                provider = provider,
                template = template,
                to = ?to,
                is_async = self.send_mode.is_async,
            ),
            None => tracing::info_span!(
                "mandrill.send",
                provider = provider,
                to = ?to,
                subject = ?self.message.subject,
                is_async = self.send_mode.is_async,
            ),
        }
    }

    // Not enforced; the service reports it.
    fn check_recipients(&self) {
        if !self.message.has_primary_recipient() {
            tracing::warn!("Sending message without a 'to' recipient");
        }
    }
}

impl std::fmt::Debug for MessageBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("provider", &self.client.provider_name())
            .field("message", &self.message)
            .field("send_mode", &self.send_mode)
            .finish()
    }
}

fn log_outcome(result: &Result<SendResult, MailError>) {
    match result {
        Ok(r) => tracing::info!(
            recipients = r.recipients.len(),
            rejected = r.rejected().len(),
            "Message accepted"
        ),
        Err(e) => tracing::error!(error = %e, "Message delivery failed"),
    }
}

fn swallow(result: Result<SendResult, MailError>) -> Option<SendResult> {
    match result {
        Ok(r) => Some(r),
        Err(e) => {
            tracing::error!("{}", legacy_diagnostic(&e));
            None
        }
    }
}

fn legacy_diagnostic(error: &MailError) -> String {
    match error {
        MailError::Delivery { message, .. } => format!("Mandrill Error: {}", message),
        other => format!("Mandrill Error: {}", other),
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(provider: &'static str, kind: &'static str, ok: bool, start: Instant) {
    let status = if ok { "success" } else { "error" };
    metrics::counter!(
        "mandrill_messages_total",
        "provider" => provider,
        "kind" => kind,
        "status" => status
    )
    .increment(1);
    metrics::histogram!("mandrill_send_duration_seconds", "provider" => provider)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LocalClient;
    use crate::send_mode::DEFAULT_IP_POOL;

    fn builder() -> (MessageBuilder, LocalClient) {
        let client = LocalClient::new();
        (MessageBuilder::with_client(client.clone()), client)
    }

    #[test]
    fn test_initial_state() {
        let (builder, _) = builder();
        assert!(!builder.send_mode().is_async);
        assert_eq!(builder.send_mode().ip_pool, DEFAULT_IP_POOL);
        assert_eq!(builder.message(), &MessageConfiguration::new());
        assert_eq!(builder.client().provider_name(), "local");
    }

    #[test]
    fn test_chaining() {
        let (mut builder, _) = builder();
        builder
            .set_from("a@x.com", "A")
            .add_to("b@y.com", "B")
            .add_cc("c@y.com", "")
            .set_subject("Hi")
            .set_body_text("hello")
            .set_body_html("<p>hello</p>")
            .set_async(true);

        let message = builder.message();
        assert_eq!(message.sender(), Some(("a@x.com", "A")));
        assert_eq!(message.to.len(), 2);
        assert_eq!(message.html.as_deref(), Some("<p>hello</p>"));
        assert!(builder.send_mode().is_async);
    }

    #[test]
    fn test_add_header_replaces() {
        let (mut builder, _) = builder();
        builder.add_header("Reply-To", "one@example.com");
        builder.add_header("X-Priority", "1");

        let headers = &builder.message().headers;
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Priority").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_append_header_merges() {
        let (mut builder, _) = builder();
        builder
            .append_header("Reply-To", "one@example.com")
            .append_header("X-Priority", "1")
            .append_header("X-Priority", "2");

        let headers = &builder.message().headers;
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Priority").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_merge_vars() {
        let (mut builder, _) = builder();
        builder
            .add_global_merge_var("COMPANY", "Acme")
            .add_global_merge_var("YEAR", 2024)
            .add_merge_vars("bob@example.com", [("FNAME", "Bob")]);

        let message = builder.message();
        assert_eq!(message.global_merge_vars[0], MergeVar::new("COMPANY", "Acme"));
        assert_eq!(message.global_merge_vars[1].content, serde_json::json!(2024));
        assert_eq!(message.merge_vars[0].rcpt, "bob@example.com");
        assert_eq!(message.merge_vars[0].vars, vec![MergeVar::new("FNAME", "Bob")]);
    }

    #[test]
    fn test_common_options() {
        let (mut builder, _) = builder();
        builder
            .add_tag("welcome")
            .add_metadata("user_id", 42)
            .set_important(true)
            .set_track_opens(true)
            .set_track_clicks(false)
            .set_merge_language(MergeLanguage::Handlebars);

        let message = builder.message();
        assert_eq!(message.tags, vec!["welcome"]);
        assert_eq!(message.metadata["user_id"], 42);
        assert!(message.important);
        assert_eq!(message.track_opens, Some(true));
        assert_eq!(message.track_clicks, Some(false));
        assert_eq!(message.merge_language, MergeLanguage::Handlebars);
    }

    #[test]
    fn test_set_option_through_builder() {
        let (mut builder, _) = builder();
        builder.set_option("bcc_address", "audit@example.com").unwrap();
        assert_eq!(
            builder.message().bcc_address.as_deref(),
            Some("audit@example.com")
        );
        assert!(builder.set_option("nope", true).is_err());
    }

    #[tokio::test]
    async fn test_send_or_log_swallows() {
        let (mut builder, client) = builder();
        builder.add_to("b@y.com", "");
        client.set_failure("quota exceeded");

        assert!(builder.send_or_log().await.is_none());
        assert!(builder.send_template_or_log("welcome", &[]).await.is_none());

        client.clear_failure();
        assert!(builder.send_or_log().await.is_some());
    }

    #[test]
    fn test_legacy_diagnostic_text() {
        assert_eq!(
            legacy_diagnostic(&MailError::delivery("quota exceeded")),
            "Mandrill Error: quota exceeded"
        );
        assert_eq!(
            legacy_diagnostic(&MailError::Http("connection reset".into())),
            "Mandrill Error: HTTP error: connection reset"
        );
    }

    #[test]
    fn test_debug_shows_provider() {
        let (builder, _) = builder();
        assert!(format!("{builder:?}").contains("local"));
    }
}
