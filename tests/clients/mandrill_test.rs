//! Mandrill client tests.

use mandrill_mailer::providers::MandrillClient;
use mandrill_mailer::{
    ApiMode, Credentials, DeliveryStatus, MailError, MessageBuilder, TemplateContent,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn builder_for(server: &MockServer) -> MessageBuilder {
    let client = MandrillClient::new("md-key").base_url(server.uri());
    let mut builder = MessageBuilder::with_client(client);
    builder
        .set_from("steve.rogers@example.com", "Steve Rogers")
        .add_to("tony.stark@example.com", "Tony Stark")
        .set_subject("Hello, Avengers!")
        .set_body_html("<h1>Hello</h1>");
    builder
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([
        {
            "email": "tony.stark@example.com",
            "status": "sent",
            "reject_reason": null,
            "_id": "abc123abc123abc123abc123abc123"
        }
    ]))
}

fn error_response(code: i64, name: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(json!({
        "status": "error",
        "code": code,
        "name": name,
        "message": message
    }))
}

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_send_returns_statuses() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "key": "md-key",
            "async": false,
            "ip_pool": "Main Pool",
            "message": {
                "from_email": "steve.rogers@example.com",
                "from_name": "Steve Rogers",
                "to": [{"email": "tony.stark@example.com", "name": "Tony Stark", "type": "to"}],
                "subject": "Hello, Avengers!",
                "html": "<h1>Hello</h1>"
            }
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let result = builder.send().await.unwrap();
    assert_eq!(result.recipients.len(), 1);
    assert_eq!(result.recipients[0].status, DeliveryStatus::Sent);
    assert_eq!(result.recipients[0].id, "abc123abc123abc123abc123abc123");
}

#[tokio::test]
async fn send_mode_is_sent_at_top_level() {
    let server = MockServer::start().await;
    let mut builder = builder_for(&server);
    builder
        .set_async(true)
        .set_ip_pool(Some("Dedicated-1"))
        .set_send_at("2030-04-01 09:15:00")
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(body_partial_json(json!({
            "async": true,
            "ip_pool": "Dedicated-1",
            "send_at": "2030-04-01 09:15:00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "tony.stark@example.com", "status": "scheduled", "_id": "id1"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result = builder.send().await.unwrap();
    assert_eq!(result.recipients[0].status, DeliveryStatus::Scheduled);
}

// ============================================================================
// All Fields Tests
// ============================================================================

#[tokio::test]
async fn send_with_options_and_files() {
    let server = MockServer::start().await;
    let mut builder = builder_for(&server);
    builder
        .add_cc("bruce.banner@example.com", "")
        .add_header("Reply-To", "iron.stark@example.com")
        .add_attachment("text/plain", "notes.txt", "Hello")
        .add_global_merge_var("TEAM", "Avengers")
        .add_merge_vars("tony.stark@example.com", [("FNAME", "Tony")])
        .add_tag("assemble")
        .add_metadata("mission", "42")
        .set_track_opens(true);

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(body_partial_json(json!({
            "message": {
                "to": [
                    {"email": "tony.stark@example.com", "name": "Tony Stark", "type": "to"},
                    {"email": "bruce.banner@example.com", "name": "", "type": "cc"}
                ],
                "headers": {"Reply-To": "iron.stark@example.com"},
                "attachments": [{"type": "text/plain", "name": "notes.txt", "content": "SGVsbG8="}],
                "global_merge_vars": [{"name": "TEAM", "content": "Avengers"}],
                "merge_vars": [{"rcpt": "tony.stark@example.com", "vars": [{"name": "FNAME", "content": "Tony"}]}],
                "tags": ["assemble"],
                "metadata": {"mission": "42"},
                "track_opens": true,
                "merge": true,
                "merge_language": "mailchimp"
            }
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(builder.send().await.is_ok());
}

// ============================================================================
// Template Tests
// ============================================================================

#[tokio::test]
async fn send_template_uses_template_endpoint() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .and(body_partial_json(json!({
            "key": "md-key",
            "template_name": "welcome",
            "template_content": [{"name": "FNAME", "content": "Bob"}],
            "message": {"subject": "Hello, Avengers!"},
            "async": false
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let result = builder
        .send_template("welcome", &[TemplateContent::new("FNAME", "Bob")])
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn send_template_with_empty_content() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .and(body_partial_json(json!({"template_content": []})))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(builder.send_template("receipt", &[]).await.is_ok());
}

// ============================================================================
// Error Tests
// ============================================================================

#[tokio::test]
async fn api_error_becomes_delivery_error() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(error_response(-1, "Invalid_Key", "Invalid API key"))
        .expect(1)
        .mount(&server)
        .await;

    match builder.send().await {
        Err(MailError::Delivery {
            name,
            message,
            status,
        }) => {
            assert_eq!(name.as_deref(), Some("Invalid_Key"));
            assert_eq!(message, "Invalid API key");
            assert_eq!(status, Some(500));
        }
        other => panic!("expected delivery error, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_body_still_reports_status() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    match builder.send().await {
        Err(MailError::Delivery { status, message, .. }) => {
            assert_eq!(status, Some(502));
            assert!(message.contains("502"));
        }
        other => panic!("expected delivery error, got {other:?}"),
    }
}

#[tokio::test]
async fn send_or_log_swallows_api_error() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(error_response(-50, "PaymentRequired", "quota exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(builder.send_or_log().await.is_none());
}

#[tokio::test]
async fn rejected_recipient_is_not_an_error() {
    let server = MockServer::start().await;
    let builder = builder_for(&server);

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "tony.stark@example.com", "status": "rejected", "reject_reason": "hard-bounce", "_id": "x"}
        ])))
        .mount(&server)
        .await;

    let result = builder.send().await.unwrap();
    assert!(!result.all_accepted());
    assert_eq!(
        result.rejected()[0].reject_reason.as_deref(),
        Some("hard-bounce")
    );
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn builder_requires_key_for_mode() {
    let credentials = Credentials::new().live("md-live");

    assert!(MessageBuilder::new(&credentials, ApiMode::Live).is_ok());

    let err = MessageBuilder::new(&credentials, ApiMode::Test).unwrap_err();
    assert!(matches!(err, MailError::Configuration(_)));
}

#[test]
fn builder_uses_mandrill_client() {
    let credentials = Credentials::new().test("md-test");
    let builder = MessageBuilder::new(&credentials, ApiMode::Test).unwrap();
    assert_eq!(builder.client().provider_name(), "mandrill");
}
