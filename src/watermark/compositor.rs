//! Watermark compositor.
//!
//! Places the rendered watermark text at the bottom-center of a copy of the
//! target image and alpha-blends it in. The caller's buffer is never
//! mutated.
//!
//! The text is horizontally centered (`x = (W - Tw) / 2`, which goes
//! negative when the text is wider than the image and simply clips
//! off-canvas on both sides), and the baseline sits
//! `textHeight + vertical_padding` above the bottom edge.

use super::error::WatermarkError;
use super::text_renderer::{measure_text, render_text, Color, TextMetrics, TextRenderOptions};
use crate::constants::{DEFAULT_FONT_SIZE, DEFAULT_VERTICAL_PADDING, DEFAULT_WATERMARK_ALPHA};
use image::{DynamicImage, Rgba, RgbaImage};

/// Appearance of the stamped watermark text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkStyle {
    /// Text color (RGB).
    pub color: Color,
    /// Text alpha, 0 (transparent) to 255 (opaque).
    pub alpha: u8,
    /// Font size in pixels.
    pub font_size: f32,
    /// Use the bold font face.
    pub bold: bool,
    /// Padding between the text baseline and the bottom edge, in pixels.
    pub vertical_padding: u32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            color: Color::white(),
            alpha: DEFAULT_WATERMARK_ALPHA,
            font_size: DEFAULT_FONT_SIZE,
            bold: true,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
        }
    }
}

impl WatermarkStyle {
    fn text_options(&self) -> TextRenderOptions {
        TextRenderOptions {
            font_size: self.font_size,
            bold: self.bold,
            color: self.color,
            alpha: self.alpha,
        }
    }
}

/// Computed placement of the text layer on the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPlacement {
    /// Left edge of the text layer. Negative when the text is wider than
    /// the image.
    pub x: i32,
    /// Baseline row of the text.
    pub baseline_y: i32,
    /// Top edge of the text layer.
    pub top_y: i32,
}

/// Bottom-center placement for a measured text run.
pub fn place_bottom_center(
    image_width: u32,
    image_height: u32,
    metrics: &TextMetrics,
    vertical_padding: u32,
) -> TextPlacement {
    let text_width = metrics.width.ceil() as i32;
    let text_height = metrics.height().ceil() as i32;

    let x = (image_width as i32 - text_width) / 2;
    let baseline_y = image_height as i32 - text_height - vertical_padding as i32;
    let top_y = baseline_y - metrics.ascent.ceil() as i32;

    TextPlacement {
        x,
        baseline_y,
        top_y,
    }
}

/// Stamp `text` onto a copy of `image`.
///
/// Returns a new RGBA buffer; the input is never mutated. Empty `text`
/// yields an unmodified copy. Output is deterministic for identical
/// `(image, text, style)` inputs.
pub fn composite(
    image: &DynamicImage,
    text: &str,
    style: &WatermarkStyle,
) -> Result<RgbaImage, WatermarkError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(WatermarkError::Input(format!(
            "image has degenerate dimensions {}x{}",
            width, height
        )));
    }

    let mut canvas = image.to_rgba8();
    if text.is_empty() {
        return Ok(canvas);
    }

    let metrics = measure_text(text, style.font_size, style.bold)?;
    let layer = render_text(text, &style.text_options())?;
    let placement = place_bottom_center(width, height, &metrics, style.vertical_padding);

    blend_layer(&mut canvas, &layer, placement.x, placement.top_y);

    Ok(canvas)
}

/// Blend the text layer onto the target at `(x, y)`, clipping any part
/// that falls outside the target bounds (including negative positions).
fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage, x: i32, y: i32) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;
    let layer_width = layer.width() as i32;
    let layer_height = layer.height() as i32;

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + layer_width).min(target_width);
    let y_end = (y + layer_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let lx = (tx - x) as u32;
            let ly = (ty - y) as u32;

            let fg = layer.get_pixel(lx, ly);
            if fg[3] == 0 {
                continue;
            }

            let bg = target.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixels(*bg, *fg);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Porter-Duff "over" operator:
/// result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0) as u8,
    ])
}
