use base64::Engine;
use serde::Serialize;

/// File name used when the source gave none.
pub const UNKNOWN_FILE_NAME: &str = "Imagen desconocida";

/// An image staged by the user but not yet submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCandidate {
    #[serde(skip)]
    bytes: Vec<u8>,
    media_type: String,
    file_name: String,
}

impl ImageCandidate {
    /// Only intake constructs candidates, after the media type check.
    pub(crate) fn new(bytes: Vec<u8>, media_type: String, file_name: String) -> Self {
        Self {
            bytes,
            media_type,
            file_name,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name recorded in history; never empty.
    pub fn display_file_name(&self) -> &str {
        if self.file_name.trim().is_empty() {
            UNKNOWN_FILE_NAME
        } else {
            &self.file_name
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Inline `data:` URL for previews.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let candidate = ImageCandidate::new(b"abc".to_vec(), "image/png".into(), "a.png".into());
        assert_eq!(candidate.data_url(), "data:image/png;base64,YWJj");
        assert_eq!(candidate.size(), 3);
    }

    #[test]
    fn test_empty_file_name_falls_back() {
        let candidate = ImageCandidate::new(vec![1], "image/jpeg".into(), "  ".into());
        assert_eq!(candidate.display_file_name(), UNKNOWN_FILE_NAME);
    }
}
