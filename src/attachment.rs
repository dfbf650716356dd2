//! Base64-encoded attachments and inline images.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MailError;

/// A file embedded in a message, already base64-encoded.
///
/// Used for both `attachments` and inline `images`. The raw bytes are encoded
/// on construction and never kept around.
///
/// # Examples
///
/// ```
/// use mandrill_mailer::EncodedFile;
///
/// let report = EncodedFile::from_bytes("text/plain", "report.txt", b"Hello");
/// assert_eq!(report.content, "SGVsbG8=");
/// ```
///
/// ```rust,ignore
/// // MIME type comes from the extension: "image/png"
/// let logo = EncodedFile::from_path("logo", "assets/logo.png")?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFile {
    /// MIME type (e.g., "application/pdf", "image/png")
    #[serde(rename = "type")]
    pub mime_type: String,
    /// File name, or the Content-ID for inline images
    pub name: String,
    /// Base64-encoded content
    pub content: String,
}

impl EncodedFile {
    /// Encode raw bytes with an explicit MIME type.
    pub fn from_bytes(
        mime_type: impl Into<String>,
        name: impl Into<String>,
        data: impl AsRef<[u8]>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            name: name.into(),
            content: base64::engine::general_purpose::STANDARD.encode(data.as_ref()),
        }
    }

    /// Read a file and encode it.
    ///
    /// The MIME type is guessed from the path's extension only; the file
    /// content is never sniffed.
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, MailError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| MailError::ResourceRead(format!("{}: {}", path.display(), e)))?;

        Ok(Self::from_bytes(mime_type_for(path), name, data))
    }

    /// Decode the content back into bytes.
    pub fn decoded(&self) -> Result<Vec<u8>, MailError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.content)
            .map_err(|e| MailError::ResourceRead(format!("{}: {}", self.name, e)))
    }
}

/// MIME type for a path, by extension.
pub(crate) fn mime_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}
