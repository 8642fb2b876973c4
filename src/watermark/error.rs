//! Watermark error types.
//!
//! Defines errors that can occur while rendering and compositing the
//! watermark text.

use std::fmt;

/// Errors that can occur during watermark compositing.
#[derive(Debug)]
pub enum WatermarkError {
    /// The target image cannot carry a watermark (degenerate dimensions)
    Input(String),

    /// Failed to render the watermark text
    Render(String),

    /// Invalid watermark configuration (color, font size)
    Config(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(msg) => write!(f, "Invalid input image: {}", msg),
            Self::Render(msg) => write!(f, "Failed to render watermark text: {}", msg),
            Self::Config(msg) => write!(f, "Watermark configuration error: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
