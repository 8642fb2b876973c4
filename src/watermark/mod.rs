//! Watermark module for stamping text onto images.
//!
//! The stamp is a single fixed-format text run ("@handle - year") placed at
//! the bottom-center of the image. The module splits into:
//!
//! - [`text_renderer`] - glyph measurement and rasterization over an
//!   embedded font
//! - [`compositor`] - placement math and alpha blending onto a copy of the
//!   target image
//!
//! Both halves are pure: no I/O, deterministic output for identical inputs.
//! Persistence of the stamped image lives in [`crate::publish`].

pub mod compositor;
pub mod error;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{composite, place_bottom_center, TextPlacement, WatermarkStyle};
pub use error::WatermarkError;
pub use text_renderer::{
    measure_text, parse_hex_color, render_text, Color, TextMetrics, TextRenderOptions,
};
