use crate::error::IntakeError;
use crate::models::intake_types::ImageCandidate;
use std::path::Path;
use tracing::debug;

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
];

/// Fallback when neither extension nor content identify the file.
const OCTET_STREAM: &str = "application/octet-stream";

pub struct ImageIntake;

impl ImageIntake {
    /// Stages `bytes` for submission if the declared media type is an image kind.
    pub fn validate(
        bytes: Vec<u8>,
        media_type: &str,
        file_name: &str,
    ) -> Result<ImageCandidate, IntakeError> {
        let normalized = media_type.trim().to_ascii_lowercase();
        if !normalized.starts_with("image/") {
            return Err(IntakeError::NotAnImage {
                media_type: media_type.to_string(),
            });
        }

        debug!(file = %file_name, bytes = bytes.len(), media_type = %normalized, "Image staged");
        Ok(ImageCandidate::new(bytes, normalized, file_name.to_string()))
    }

    /// Reads a file from disk and validates it with an inferred media type.
    pub async fn from_path(path: &Path) -> Result<ImageCandidate, IntakeError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| IntakeError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let media_type = media_type_for(path, &bytes);
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self::validate(bytes, &media_type, &file_name)
    }
}

/// Media type from the extension, then from magic bytes.
pub fn media_type_for(path: &Path, bytes: &[u8]) -> String {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .and_then(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        });

    if let Some(mime) = by_extension {
        return mime.to_string();
    }

    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => OCTET_STREAM.to_string(),
    }
}
