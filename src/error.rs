//! Error types for the upload page and the offline worker.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Fallback shown when the server rejects an upload without saying why.
pub const SERVER_REJECTED_FALLBACK: &str = "Fehler beim Hochladen";

/// Reasons a single upload attempt ends without success.
///
/// The `Display` text is exactly what the status area shows to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Submit was pressed with no file in the input.
    #[error("Bitte wähle ein Foto aus")]
    MissingFile,

    /// File is larger than the upload limit.
    #[error("Datei zu groß. Maximal {limit_mb}MB erlaubt.")]
    FileTooLarge {
        /// Declared size in bytes.
        size: u64,
        /// Configured limit in whole mebibytes.
        limit_mb: u64,
    },

    /// Declared media type is not JPEG, PNG or WEBP.
    #[error("Ungültiger Dateityp. Nur JPG, PNG und WEBP erlaubt.")]
    UnsupportedType {
        /// Declared media type, possibly empty.
        media_type: String,
    },

    /// The endpoint answered but reported failure.
    #[error("{0}")]
    ServerRejected(String),

    /// No usable response was obtained.
    #[error("Netzwerkfehler beim Hochladen")]
    NetworkError {
        /// Underlying failure, logged but never shown.
        detail: String,
    },
}

impl UploadError {
    /// Build a rejection from the optional server-supplied error text.
    pub fn server_rejected(error: Option<String>) -> Self {
        match error {
            Some(text) if !text.is_empty() => UploadError::ServerRejected(text),
            _ => UploadError::ServerRejected(SERVER_REJECTED_FALLBACK.to_string()),
        }
    }
}

/// Errors raised by the service worker and its registration.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// `navigator.serviceWorker.register` rejected.
    #[error("Service Worker registration failed: {0}")]
    RegistrationFailed(String),

    /// At least one manifest URL could not be added during install.
    #[error("cache install failed: {0}")]
    CacheInstallFailed(String),

    /// A cache storage operation failed.
    #[error("cache operation failed: {0}")]
    Cache(String),

    /// The network request could not be completed.
    #[error("network request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The network is unavailable and nothing is cached for the URL.
    #[error("offline and no cached response for {url}")]
    Offline { url: String },

    /// A push message body could not be decoded.
    #[error("invalid push payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Any other failure reported by a browser API.
    #[error("browser API error: {0}")]
    Js(String),
}

impl From<WorkerError> for JsValue {
    fn from(err: WorkerError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Render a thrown JS value as text for logs and error payloads.
pub fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
