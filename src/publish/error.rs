//! Error types for artifact publication

use thiserror::Error;

/// Errors raised while publishing a watermarked image.
///
/// `Reserve` happens before any bytes are written; the other variants
/// happen after a slot reservation exists, and the publisher removes the
/// pending reservation before surfacing them.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to reserve artifact slot: {0}")]
    Reserve(String),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("Failed to write artifact data: {0}")]
    Write(String),

    #[error("Failed to finalize artifact: {0}")]
    Finalize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PublishError::Reserve("disk full".to_string());
        assert_eq!(err.to_string(), "Failed to reserve artifact slot: disk full");

        let err = PublishError::Encode("dimensions too large".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to encode JPEG: dimensions too large"
        );
    }
}
