// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Watermark defaults
// =============================================================================

/// Default font size in pixels
pub const DEFAULT_FONT_SIZE: f32 = 128.0;

/// Default watermark alpha (0 = transparent, 255 = opaque).
/// Visible without fully obscuring the photo underneath; tune per
/// deployment via `watermark.alpha`.
pub const DEFAULT_WATERMARK_ALPHA: u8 = 150;

/// Default watermark color as a hex string
pub const DEFAULT_WATERMARK_COLOR: &str = "#FFFFFF";

/// Default padding between the text baseline and the bottom edge, in pixels
pub const DEFAULT_VERTICAL_PADDING: u32 = 20;

// =============================================================================
// Publication defaults
// =============================================================================

/// Default namespace used for the watermark directory and artifact names
pub const DEFAULT_NAMESPACE: &str = "photostamp";

/// Default JPEG quality (1-100). 100 means no additional compression loss
/// beyond what the format itself imposes.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Name fragment that identifies published artifacts in the gallery query
pub const WATERMARK_MARKER: &str = "-watermarked_";

/// File extension of published artifacts
pub const ARTIFACT_EXTENSION: &str = "jpg";

/// Extension appended to a reserved-but-incomplete artifact. Files carrying
/// it are invisible to the gallery query until the finalizing rename.
pub const PENDING_EXTENSION: &str = "pending";

/// Maximum slot-reservation attempts before a publish is reported as failed.
/// Each retry bumps the millisecond timestamp suffix by one.
pub const MAX_RESERVE_ATTEMPTS: u64 = 64;
