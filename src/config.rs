//! Application-level configuration constants.

// Upload limits
pub const BYTES_PER_MB: u64 = 1024 * 1024;
pub const MAX_FILE_SIZE_MB: u64 = 5;
pub const MAX_FILE_BYTES: u64 = MAX_FILE_SIZE_MB * BYTES_PER_MB;
pub const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

// Caption counter thresholds (advisory only)
pub const CAPTION_WARNING_AFTER: usize = 80;
pub const CAPTION_LIMIT: usize = 100;

// UI Behavior
pub const REDIRECT_DELAY_MS: u32 = 1_500;
pub const MESSAGE_HIDE_MS: u32 = 3_000;

// Endpoints
pub const UPLOAD_ENDPOINT: &str = "/upload";
pub const GALLERY_URL: &str = "/gallery";
pub const ROOT_URL: &str = "/";
pub const SW_SCRIPT: &str = "/static/sw.js";
pub const UPLOAD_ROOT_ID: &str = "upload-root";

// Offline cache
pub const CACHE_NAME: &str = "snappic-v1";
pub const PRECACHE_URLS: [&str; 6] = [
    "/",
    "/gallery",
    "/static/style.css",
    "/static/script.js",
    "/static/manifest.json",
    "/static/icon-192.png",
];
/// Compiled wasm bundles. Cached next to the manifest so both programs start offline.
pub const RUNTIME_URLS: [&str; 4] = [
    "/static/pkg/snappic.js",
    "/static/pkg/snappic_bg.wasm",
    "/static/pkg/sw.js",
    "/static/pkg/sw_bg.wasm",
];

// Push notifications
pub const NOTIFICATION_ICON: &str = "/static/icon-192.png";
pub const NOTIFICATION_BADGE: &str = "/static/icon-192.png";
pub const NOTIFICATION_VIBRATE: [u32; 3] = [100, 50, 100];
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

// UI text
pub const BUTTON_LABEL: &str = "Foto teilen";
pub const BUTTON_LABEL_BUSY: &str = "Wird hochgeladen...";
pub const UPLOAD_SUCCESS_TEXT: &str = "Foto erfolgreich hochgeladen!";
pub const ONLINE_TEXT: &str = "Verbindung wiederhergestellt";
pub const OFFLINE_TEXT: &str = "Keine Internetverbindung";
pub const VIEWPORT_CONTENT: &str =
    "width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no";

/// Settings consumed by the upload controller.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSettings {
    pub endpoint: String,
    pub gallery_url: String,
    pub max_file_bytes: u64,
    pub redirect_delay_ms: u32,
    pub message_hide_ms: u32,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: UPLOAD_ENDPOINT.to_string(),
            gallery_url: GALLERY_URL.to_string(),
            max_file_bytes: MAX_FILE_BYTES,
            redirect_delay_ms: REDIRECT_DELAY_MS,
            message_hide_ms: MESSAGE_HIDE_MS,
        }
    }
}

/// Settings consumed by the offline cache worker.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineSettings {
    /// Version tag of the one live cache generation.
    pub cache_name: String,
    pub precache_urls: Vec<String>,
    /// Best-effort extras; a miss here does not fail install.
    pub runtime_urls: Vec<String>,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            precache_urls: PRECACHE_URLS.iter().map(|u| u.to_string()).collect(),
            runtime_urls: RUNTIME_URLS.iter().map(|u| u.to_string()).collect(),
        }
    }
}
