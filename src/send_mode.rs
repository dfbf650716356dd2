//! Dispatch options sent alongside the message: `async`, `ip_pool`, `send_at`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::MailError;

/// IP pool used when none is given.
pub const DEFAULT_IP_POOL: &str = "Main Pool";

/// Format of `send_at` on the wire (UTC).
pub const SEND_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How the service should dispatch a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMode {
    /// Queue the message instead of returning a per-recipient result.
    ///
    /// This only changes the service's behavior; the local call still waits
    /// for the response.
    #[serde(rename = "async")]
    pub is_async: bool,
    /// Dedicated IP pool name. No effect without dedicated IPs.
    pub ip_pool: String,
    /// Scheduled delivery time (UTC). A time in the past sends immediately.
    #[serde(serialize_with = "serialize_send_at")]
    pub send_at: NaiveDateTime,
}

impl Default for SendMode {
    fn default() -> Self {
        Self {
            is_async: false,
            ip_pool: DEFAULT_IP_POOL.to_string(),
            send_at: Utc::now().naive_utc(),
        }
    }
}

impl SendMode {
    /// Synchronous, default pool, send now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set async mode.
    pub fn set_async(&mut self, flag: bool) {
        self.is_async = flag;
    }

    /// Set the IP pool. `None` or an empty name selects [`DEFAULT_IP_POOL`].
    pub fn set_ip_pool(&mut self, pool: Option<&str>) {
        self.ip_pool = match pool {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_IP_POOL.to_string(),
        };
    }

    /// Set `send_at` from a `YYYY-MM-DD HH:MM:SS` UTC string.
    pub fn set_send_at(&mut self, timestamp: &str) -> Result<(), MailError> {
        self.send_at = parse_send_at(timestamp)?;
        Ok(())
    }

    /// Set `send_at` from a UTC datetime. Sub-second precision is dropped on the wire.
    pub fn set_send_at_datetime(&mut self, at: DateTime<Utc>) {
        self.send_at = at.naive_utc();
    }

    /// `send_at` formatted for the wire.
    pub fn send_at_string(&self) -> String {
        self.send_at.format(SEND_AT_FORMAT).to_string()
    }
}

/// Parse a canonical `send_at` timestamp.
///
/// Only the exact zero-padded form is accepted; chrono alone would also take
/// single-digit fields, signed years and loose whitespace.
pub fn parse_send_at(timestamp: &str) -> Result<NaiveDateTime, MailError> {
    let parsed = NaiveDateTime::parse_from_str(timestamp, SEND_AT_FORMAT)
        .map_err(|e| MailError::InvalidSendAt(format!("'{}': {}", timestamp, e)))?;

    if parsed.format(SEND_AT_FORMAT).to_string() != timestamp {
        return Err(MailError::InvalidSendAt(format!(
            "'{}': expected YYYY-MM-DD HH:MM:SS",
            timestamp
        )));
    }
    Ok(parsed)
}

fn serialize_send_at<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&at.format(SEND_AT_FORMAT))
}
