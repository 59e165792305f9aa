//! Error types for the scan pipeline
//!
//! Every failure a request can hit maps to one of a small set of kinds so
//! the server can surface a distinct, user-readable message for each.

use thiserror::Error;

/// Errors produced while processing an uploaded image.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The uploaded file could not be decoded as an image.
    #[error("could not read the uploaded image: {0}")]
    UnreadableImage(String),

    /// A detected QR payload could not be interpreted as UTF-8 text.
    #[error("failed to decode QR payload: {0}")]
    DecodeFailure(String),

    /// Anything unexpected during processing.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ScanError {
    /// Short message suitable for showing to the user on the error page.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::UnreadableImage(_) => {
                "The uploaded file could not be read as a JPEG or PNG image.".to_string()
            }
            ScanError::DecodeFailure(_) => {
                "A QR code was found but its payload could not be decoded as text.".to_string()
            }
            ScanError::Internal(_) => {
                "An unexpected error occurred while processing the image.".to_string()
            }
        }
    }
}

impl From<image::ImageError> for ScanError {
    fn from(err: image::ImageError) -> Self {
        ScanError::UnreadableImage(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ScanError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ScanError::DecodeFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_image_message() {
        let err = ScanError::UnreadableImage("bad magic bytes".to_string());
        assert!(err.to_string().contains("bad magic bytes"));
        assert!(err.user_message().contains("JPEG or PNG"));
    }

    #[test]
    fn test_utf8_failure_maps_to_decode_failure() {
        let invalid = String::from_utf8(vec![0xff, 0xfe, 0xfd]).unwrap_err();
        let err: ScanError = invalid.into();
        assert!(matches!(err, ScanError::DecodeFailure(_)));
    }

    #[test]
    fn test_anyhow_maps_to_internal() {
        let err: ScanError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ScanError::Internal(_)));
        assert!(err.user_message().contains("unexpected"));
    }
}
