//! API key selection for live and test mode.

use std::env;
use std::fmt;

use crate::error::MailError;

/// Environment variable holding the live API key.
pub const API_KEY_ENV: &str = "MANDRILL_API_KEY";

/// Environment variable holding the test API key.
pub const TEST_API_KEY_ENV: &str = "MANDRILL_TEST_API_KEY";

/// Which API key to send with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiMode {
    /// Production key; messages are delivered.
    #[default]
    Live,
    /// Test key; the service accepts messages without delivering them.
    Test,
}

/// Live and test API keys.
///
/// Keys are supplied by the caller, never embedded:
///
/// ```
/// use mandrill_mailer::{ApiMode, Credentials};
///
/// let credentials = Credentials::new().live("live-key").test("test-key");
/// assert_eq!(credentials.resolve(ApiMode::Test).unwrap(), "test-key");
/// ```
#[derive(Clone, Default)]
pub struct Credentials {
    live_key: Option<String>,
    test_key: Option<String>,
}

impl Credentials {
    /// Create empty credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the live API key.
    pub fn live(mut self, key: impl Into<String>) -> Self {
        self.live_key = Some(key.into());
        self
    }

    /// Set the test API key.
    pub fn test(mut self, key: impl Into<String>) -> Self {
        self.test_key = Some(key.into());
        self
    }

    /// Load keys from `MANDRILL_API_KEY` and `MANDRILL_TEST_API_KEY`.
    ///
    /// Missing variables are left unset; [`resolve`](Self::resolve) reports them.
    pub fn from_env() -> Self {
        Self {
            live_key: env::var(API_KEY_ENV).ok(),
            test_key: env::var(TEST_API_KEY_ENV).ok(),
        }
    }

    /// Get the key for a mode.
    ///
    /// Fails with [`MailError::Configuration`] if that key is missing or empty.
    pub fn resolve(&self, mode: ApiMode) -> Result<&str, MailError> {
        let (key, var) = match mode {
            ApiMode::Live => (&self.live_key, API_KEY_ENV),
            ApiMode::Test => (&self.test_key, TEST_API_KEY_ENV),
        };
        match key.as_deref() {
            Some(k) if !k.trim().is_empty() => Ok(k),
            _ => Err(MailError::Configuration(format!(
                "no API key for {:?} mode (set {} or pass it to Credentials)",
                mode, var
            ))),
        }
    }

    /// Check whether a key for the mode is present.
    pub fn is_configured(&self, mode: ApiMode) -> bool {
        self.resolve(mode).is_ok()
    }
}

// Keys stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("live_key", &self.live_key.as_ref().map(|_| "<redacted>"))
            .field("test_key", &self.test_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
