//! Delivery client implementations.
//!
//! Each client implements the [`DeliveryClient`](crate::DeliveryClient) trait.
//!
//! ## Available Clients
//!
//! | Client | Feature Flag | Description |
//! |--------|-------------|-------------|
//! | [`MandrillClient`] | `mandrill` (default) | Mandrill HTTP API |
//! | [`LocalClient`] | (none) | Captures requests in memory for dev/testing |

use chrono::Utc;

use crate::client::{DeliveryStatus, RecipientStatus, SendResult};
use crate::message::MessageConfiguration;
use crate::send_mode::SendMode;

#[cfg(feature = "mandrill")]
mod mandrill;
#[cfg(feature = "mandrill")]
pub use mandrill::MandrillClient;

mod local;
pub use local::{CapturedRequest, CapturedTemplate, LocalClient};

/// Result the service would plausibly return, for clients that do not send.
///
/// Async sends are `queued`, future `send_at` is `scheduled`, anything else
/// is `sent`.
pub(crate) fn simulated_result(message: &MessageConfiguration, mode: &SendMode) -> SendResult {
    let status = if mode.is_async {
        DeliveryStatus::Queued
    } else if mode.send_at > Utc::now().naive_utc() {
        DeliveryStatus::Scheduled
    } else {
        DeliveryStatus::Sent
    };

    SendResult::new(
        message
            .to
            .iter()
            .map(|r| {
                let id = uuid::Uuid::new_v4().simple().to_string();
                RecipientStatus::new(&r.email, status, id)
            })
            .collect(),
    )
}
