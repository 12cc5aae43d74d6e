//! Client-side checks for the selected photo and its caption.

use crate::config::{
    ALLOWED_MEDIA_TYPES, BYTES_PER_MB, CAPTION_LIMIT, CAPTION_WARNING_AFTER, MAX_FILE_SIZE_MB,
};
use crate::error::UploadError;

/// Metadata of the file currently held by the file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Declared media type, e.g. `image/png`. Empty when the browser could not tell.
    pub media_type: String,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.into(),
        }
    }

    /// Whether the browser can render a preview for this file.
    pub fn is_previewable(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// True for the media types the upload endpoint accepts.
pub fn is_valid_image_file(media_type: &str) -> bool {
    ALLOWED_MEDIA_TYPES.contains(&media_type)
}

/// True when `size` fits into `max_size_mb` mebibytes.
pub fn is_valid_file_size(size: u64, max_size_mb: u64) -> bool {
    size <= max_size_mb * BYTES_PER_MB
}

/// [`is_valid_file_size`] with the default 5 MiB limit.
pub fn is_within_default_limit(size: u64) -> bool {
    is_valid_file_size(size, MAX_FILE_SIZE_MB)
}

/// Run the submit-time checks in order, stopping at the first failure.
pub fn validate_upload(
    file: Option<&SelectedFile>,
    max_file_bytes: u64,
) -> Result<&SelectedFile, UploadError> {
    let file = file.ok_or(UploadError::MissingFile)?;

    if file.size > max_file_bytes {
        return Err(UploadError::FileTooLarge {
            size: file.size,
            limit_mb: max_file_bytes / BYTES_PER_MB,
        });
    }

    if !is_valid_image_file(&file.media_type) {
        return Err(UploadError::UnsupportedType {
            media_type: file.media_type.clone(),
        });
    }

    Ok(file)
}

/// Visual tier of the caption counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSeverity {
    Normal,
    Warning,
    Danger,
}

impl CaptionSeverity {
    /// Counter text colour for this tier.
    pub fn color(self) -> &'static str {
        match self {
            CaptionSeverity::Normal => "#666",
            CaptionSeverity::Warning => "#ff9800",
            CaptionSeverity::Danger => "#f44336",
        }
    }
}

/// Caption length as the browser reports it (UTF-16 code units).
pub fn caption_length(caption: &str) -> usize {
    caption.encode_utf16().count()
}

pub fn caption_severity(length: usize) -> CaptionSeverity {
    if length > CAPTION_LIMIT {
        CaptionSeverity::Danger
    } else if length > CAPTION_WARNING_AFTER {
        CaptionSeverity::Warning
    } else {
        CaptionSeverity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_FILE_BYTES;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn missing_file_is_checked_first() {
        assert_eq!(validate_upload(None, MAX_FILE_BYTES), Err(UploadError::MissingFile));
    }

    #[test]
    fn size_is_checked_before_type() {
        let file = SelectedFile::new("clip.gif", 6 * MIB, "image/gif");
        assert_eq!(
            validate_upload(Some(&file), MAX_FILE_BYTES),
            Err(UploadError::FileTooLarge { size: 6 * MIB, limit_mb: 5 })
        );
    }

    #[test]
    fn exactly_five_mib_is_accepted() {
        let file = SelectedFile::new("big.png", 5 * MIB, "image/png");
        assert!(validate_upload(Some(&file), MAX_FILE_BYTES).is_ok());

        let over = SelectedFile::new("big.png", 5 * MIB + 1, "image/png");
        assert!(matches!(
            validate_upload(Some(&over), MAX_FILE_BYTES),
            Err(UploadError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn size_message_follows_configured_limit() {
        let file = SelectedFile::new("big.png", 3 * MIB, "image/png");
        let err = validate_upload(Some(&file), 2 * MIB).unwrap_err();
        assert_eq!(err.to_string(), "Datei zu groß. Maximal 2MB erlaubt.");
    }

    #[test]
    fn only_jpeg_png_and_webp_pass() {
        for media_type in ["image/jpeg", "image/jpg", "image/png", "image/webp"] {
            let file = SelectedFile::new("photo", MIB, media_type);
            assert!(validate_upload(Some(&file), MAX_FILE_BYTES).is_ok(), "{media_type}");
        }
        for media_type in ["image/gif", "image/svg+xml", "application/pdf", "", "IMAGE/PNG"] {
            let file = SelectedFile::new("photo", MIB, media_type);
            assert_eq!(
                validate_upload(Some(&file), MAX_FILE_BYTES),
                Err(UploadError::UnsupportedType { media_type: media_type.to_string() })
            );
        }
    }

    #[test]
    fn standalone_validators() {
        assert!(is_valid_image_file("image/webp"));
        assert!(!is_valid_image_file("image/heic"));
        assert!(is_valid_file_size(2 * MIB, 2));
        assert!(!is_valid_file_size(2 * MIB + 1, 2));
        assert!(is_within_default_limit(MAX_FILE_BYTES));
        assert!(!is_within_default_limit(MAX_FILE_BYTES + 1));
    }

    #[test]
    fn preview_needs_an_image_category() {
        assert!(SelectedFile::new("a.gif", 1, "image/gif").is_previewable());
        assert!(!SelectedFile::new("a.txt", 1, "text/plain").is_previewable());
        assert!(!SelectedFile::new("a", 1, "").is_previewable());
    }

    #[test]
    fn caption_severity_boundaries() {
        assert_eq!(caption_severity(0), CaptionSeverity::Normal);
        assert_eq!(caption_severity(80), CaptionSeverity::Normal);
        assert_eq!(caption_severity(81), CaptionSeverity::Warning);
        assert_eq!(caption_severity(100), CaptionSeverity::Warning);
        assert_eq!(caption_severity(101), CaptionSeverity::Danger);
        assert_eq!(caption_severity(500), CaptionSeverity::Danger);
    }

    #[test]
    fn caption_length_counts_utf16_units() {
        assert_eq!(caption_length("Grüße"), 5);
        assert_eq!(caption_length("📷"), 2);
        assert_eq!(caption_length(""), 0);
    }
}
