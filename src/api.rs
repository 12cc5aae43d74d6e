//! Wire format of the upload endpoint.

use crate::error::UploadError;
use serde::{Deserialize, Serialize};

/// JSON body returned by `POST /upload`.
///
/// Failure replies from the server omit `success`, so it defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl UploadResponse {
    pub fn into_result(self) -> Result<Option<String>, UploadError> {
        if self.success {
            Ok(self.filename)
        } else {
            Err(UploadError::server_rejected(self.error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_reply_carries_filename() {
        let reply: UploadResponse =
            serde_json::from_str(r#"{"success": true, "filename": "2024-01-01_a.jpg"}"#).unwrap();
        assert_eq!(reply.into_result(), Ok(Some("2024-01-01_a.jpg".to_string())));
    }

    #[test]
    fn error_reply_without_success_flag_is_a_rejection() {
        let reply: UploadResponse = serde_json::from_str(r#"{"error": "Invalid file type"}"#).unwrap();
        assert_eq!(
            reply.into_result(),
            Err(UploadError::ServerRejected("Invalid file type".into()))
        );
    }

    #[test]
    fn bare_failure_uses_fallback_text() {
        let reply: UploadResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(reply.into_result().unwrap_err().to_string(), "Fehler beim Hochladen");
    }
}
