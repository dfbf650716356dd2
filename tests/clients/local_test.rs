//! Local client tests.

use mandrill_mailer::providers::LocalClient;
use mandrill_mailer::{DeliveryClient, MessageBuilder, MessageConfiguration, SendMode};
use std::sync::Arc;

#[tokio::test]
async fn captures_builder_requests() {
    let client = LocalClient::new();
    let mut builder = MessageBuilder::with_client(client.clone());
    builder
        .set_from("tony.stark@example.com", "")
        .add_to("steve.rogers@example.com", "Steve")
        .set_subject("Hello, Avengers!");

    builder.send().await.unwrap();
    builder.send_template("assemble", &[]).await.unwrap();

    assert_eq!(client.request_count(), 2);
    assert!(client.sent_to("steve.rogers@example.com"));
    assert!(client.sent_with_subject("Hello, Avengers!"));
    assert!(client.template_sent("assemble"));

    let requests = client.requests();
    assert!(!requests[0].is_template());
    assert!(requests[1].is_template());
}

#[tokio::test]
async fn shared_through_arc() {
    let client = Arc::new(LocalClient::new());
    let builder = MessageBuilder::with_client_arc(client.clone());

    builder.send().await.unwrap();
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn clear_removes_requests() {
    let client = LocalClient::new();
    client
        .send_message(&MessageConfiguration::new(), &SendMode::new())
        .await
        .unwrap();

    client.clear();
    assert!(!client.has_requests());
    assert!(client.last_request().is_none());
}

#[test]
fn provider_name() {
    assert_eq!(LocalClient::new().provider_name(), "local");
}
