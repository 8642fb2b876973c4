//! Watermark text rendering.
//!
//! Rasterizes the watermark string into a transparent RGBA layer that the
//! compositor blends onto the target image, and exposes the text metrics
//! (advance width, ascent, descent) that drive placement.
//!
//! The fonts are embedded in the binary (DejaVu Sans, regular and bold), so
//! measurement and rendering are deterministic regardless of the host's font
//! configuration.

use super::error::WatermarkError;
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::sync::OnceLock;

/// Embedded font data (DejaVu Sans - Bitstream Vera license, freely
/// redistributable).
const REGULAR_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");
const BOLD_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");

static REGULAR_FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
static BOLD_FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

/// Get an embedded font face, parsing it lazily on first use.
fn embedded_font(bold: bool) -> Result<&'static FontRef<'static>, WatermarkError> {
    let (cell, data) = if bold {
        (&BOLD_FONT, BOLD_FONT_DATA)
    } else {
        (&REGULAR_FONT, REGULAR_FONT_DATA)
    };

    cell.get_or_init(|| FontRef::try_from_slice(data).ok())
        .as_ref()
        .ok_or_else(|| WatermarkError::Render("embedded font failed to parse".to_string()))
}

/// RGB color of the watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::Config("color must start with '#'".to_string()))?;

    let channel = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| WatermarkError::Config(format!("invalid hex digit in '{}'", hex)))
    };

    match digits.len() {
        // #RGB: each digit doubles, 0xF -> 0xFF
        3 => Ok(Color::new(
            channel(&digits[0..1])? * 17,
            channel(&digits[1..2])? * 17,
            channel(&digits[2..3])? * 17,
        )),
        6 => Ok(Color::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        n => Err(WatermarkError::Config(format!(
            "color must be #RGB or #RRGGBB, got {} digits",
            n
        ))),
    }
}

/// Metrics of a text run under a specific font face and size.
///
/// `ascent` and `descent` are both positive distances from the baseline;
/// the rendered height of the run is their sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Kerned advance width of the whole run, in pixels
    pub width: f32,
    /// Distance from the baseline to the top of the em box, in pixels
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the em box, in pixels
    pub descent: f32,
}

impl TextMetrics {
    /// Rendered text height.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Measure a text run under the embedded font.
pub fn measure_text(text: &str, font_size: f32, bold: bool) -> Result<TextMetrics, WatermarkError> {
    let font = embedded_font(bold)?;
    let scaled = font.as_scaled(PxScale::from(font_size));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok(TextMetrics {
        width,
        ascent: scaled.ascent(),
        descent: -scaled.descent(),
    })
}

/// Options for rendering a text run into an RGBA layer.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderOptions {
    /// Font size in pixels.
    pub font_size: f32,
    /// Use the bold font face.
    pub bold: bool,
    /// Text color (RGB).
    pub color: Color,
    /// Text alpha, 0 (transparent) to 255 (opaque).
    pub alpha: u8,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            font_size: crate::constants::DEFAULT_FONT_SIZE,
            bold: true,
            color: Color::white(),
            alpha: crate::constants::DEFAULT_WATERMARK_ALPHA,
        }
    }
}

/// Render a text run to a transparent RGBA layer.
///
/// The layer is exactly as tall as the run's metrics, with the baseline at
/// `metrics.ascent` from the top edge. Glyph coverage is anti-aliased and
/// scaled by `options.alpha`.
pub fn render_text(text: &str, options: &TextRenderOptions) -> Result<RgbaImage, WatermarkError> {
    if text.is_empty() {
        return Err(WatermarkError::Render("cannot render empty text".to_string()));
    }

    let font = embedded_font(options.bold)?;
    let scale = PxScale::from(options.font_size);
    let scaled = font.as_scaled(scale);

    let metrics = measure_text(text, options.font_size, options.bold)?;
    let layer_width = (metrics.width.ceil() as u32).max(1);
    let layer_height = (metrics.height().ceil() as u32).max(1);

    let mut layer = RgbaImage::new(layer_width, layer_height);

    let baseline_y = metrics.ascent;
    let mut cursor_x = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x < 0 || y < 0 || x >= layer_width as i32 || y >= layer_height as i32 {
                    return;
                }

                let pixel_alpha =
                    (coverage.clamp(0.0, 1.0) * options.alpha as f32).round() as u8;
                if pixel_alpha == 0 {
                    return;
                }

                // The color is uniform across glyphs, so overlapping
                // anti-aliased edges combine by keeping the higher coverage.
                let existing = layer.get_pixel_mut(x as u32, y as u32);
                if pixel_alpha > existing[3] {
                    *existing = Rgba([options.color.r, options.color.g, options.color.b, pixel_alpha]);
                }
            });
        }

        cursor_x += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_rrggbb() {
        assert_eq!(parse_hex_color("#FF0000").unwrap(), Color::new(255, 0, 0));
        assert_eq!(parse_hex_color("#00FF00").unwrap(), Color::new(0, 255, 0));
        assert_eq!(parse_hex_color("#0000FF").unwrap(), Color::new(0, 0, 255));
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), Color::white());
        assert_eq!(parse_hex_color("#000000").unwrap(), Color::black());
    }

    #[test]
    fn test_parse_hex_color_rgb() {
        assert_eq!(parse_hex_color("#F00").unwrap(), Color::new(255, 0, 0));
        // A=10*17=170, B=11*17=187, C=12*17=204
        assert_eq!(parse_hex_color("#ABC").unwrap(), Color::new(170, 187, 204));
        assert_eq!(parse_hex_color("#abc").unwrap(), Color::new(170, 187, 204));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert!(parse_hex_color("FF0000").is_err());
        assert!(parse_hex_color("#FF00").is_err());
        assert!(parse_hex_color("#FF00000").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_measure_text_positive_metrics() {
        let metrics = measure_text("@demo - 2024", 128.0, true).unwrap();
        assert!(metrics.width > 0.0);
        assert!(metrics.ascent > 0.0);
        assert!(metrics.descent > 0.0);
        assert!(metrics.height() > metrics.ascent);
    }

    #[test]
    fn test_measure_text_empty_has_zero_width() {
        let metrics = measure_text("", 128.0, true).unwrap();
        assert_eq!(metrics.width, 0.0);
        // Vertical metrics come from the face, not the run
        assert!(metrics.height() > 0.0);
    }

    #[test]
    fn test_font_size_scales_metrics() {
        let small = measure_text("Hello", 12.0, true).unwrap();
        let large = measure_text("Hello", 48.0, true).unwrap();
        assert!(large.width > small.width);
        assert!(large.height() > small.height());
    }

    #[test]
    fn test_bold_face_is_wider() {
        let regular = measure_text("Hello watermark", 64.0, false).unwrap();
        let bold = measure_text("Hello watermark", 64.0, true).unwrap();
        assert!(bold.width > regular.width);
    }

    #[test]
    fn test_render_text_layer_matches_metrics() {
        let options = TextRenderOptions {
            font_size: 32.0,
            ..TextRenderOptions::default()
        };
        let metrics = measure_text("Hello", 32.0, true).unwrap();
        let layer = render_text("Hello", &options).unwrap();

        assert_eq!(layer.width(), metrics.width.ceil() as u32);
        assert_eq!(layer.height(), metrics.height().ceil() as u32);

        let has_content = layer.pixels().any(|p| p[3] > 0);
        assert!(has_content, "rendered text should have visible pixels");
    }

    #[test]
    fn test_render_text_alpha_is_capped_by_style() {
        let options = TextRenderOptions {
            font_size: 32.0,
            alpha: 150,
            ..TextRenderOptions::default()
        };
        let layer = render_text("Test", &options).unwrap();

        let max_alpha = layer.pixels().map(|p| p[3]).max().unwrap_or(0);
        assert!(max_alpha > 0);
        assert!(max_alpha <= 150);
    }

    #[test]
    fn test_render_text_is_deterministic() {
        let options = TextRenderOptions::default();
        let first = render_text("@demo - 2024", &options).unwrap();
        let second = render_text("@demo - 2024", &options).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_render_empty_text_error() {
        let result = render_text("", &TextRenderOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(Color::white(), Color::new(255, 255, 255));
        assert_eq!(Color::black(), Color::new(0, 0, 0));
    }
}
