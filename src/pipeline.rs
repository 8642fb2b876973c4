//! Batch stamping pipeline.
//!
//! Drives decode -> composite -> publish for each selected image, strictly
//! sequentially and in input order. No per-image failure aborts the batch:
//! a decode error skips that image, a publish error records it, and the
//! remaining images are still processed. The caller receives a structured
//! per-image report rather than a single collapsed boolean.

use crate::config::Config;
use crate::publish::{PublishedArtifact, Publisher};
use crate::watermark::{composite, parse_hex_color, WatermarkError, WatermarkStyle};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What happened to one source image.
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    /// Composited and published.
    Published(PublishedArtifact),
    /// The source could not be decoded; the image was skipped.
    DecodeFailed(String),
    /// Compositing or publication failed after a successful decode.
    PublishFailed(String),
}

/// Per-image result, in batch input order.
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub source: PathBuf,
    pub outcome: ImageOutcome,
}

impl ImageResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ImageOutcome::Published(_))
    }
}

/// Aggregate of one batch invocation.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<ImageResult>,
}

impl BatchReport {
    /// True iff every image in the batch published.
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(ImageResult::succeeded)
    }

    pub fn published_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.published_count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// The watermark text for a handle and year: `"@<handle> - <year>"`.
pub fn watermark_text(handle: &str, year: i32) -> String {
    format!("@{} - {}", handle, year)
}

/// Sequential decode -> composite -> publish driver.
pub struct Pipeline {
    text: String,
    style: WatermarkStyle,
    publisher: Publisher,
}

impl Pipeline {
    pub fn new(text: String, style: WatermarkStyle, publisher: Publisher) -> Self {
        Self {
            text,
            style,
            publisher,
        }
    }

    /// Build a pipeline from configuration, deriving the watermark text
    /// from the configured handle and `year`.
    pub fn from_config(config: &Config, year: i32) -> Result<Self, WatermarkError> {
        let color = parse_hex_color(&config.watermark.color)?;
        let style = WatermarkStyle {
            color,
            alpha: config.watermark.alpha,
            font_size: config.watermark.font_size,
            bold: config.watermark.bold,
            vertical_padding: config.watermark.vertical_padding,
        };

        Ok(Self::new(
            watermark_text(&config.watermark.handle, year),
            style,
            Publisher::from_output_config(&config.output),
        ))
    }

    /// The text this pipeline stamps.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The directory artifacts are published into.
    pub fn gallery_dir(&self) -> &Path {
        self.publisher.directory()
    }

    /// Process the whole batch. Empty input yields an empty report.
    pub fn run(&self, sources: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();

        for source in sources {
            let outcome = self.process_one(source);
            report.results.push(ImageResult {
                source: source.clone(),
                outcome,
            });
        }

        report
    }

    fn process_one(&self, source: &Path) -> ImageOutcome {
        let decoded = match image::open(source) {
            Ok(image) => image,
            Err(e) => {
                error!(source = %source.display(), error = %e, "failed to decode image");
                return ImageOutcome::DecodeFailed(e.to_string());
            }
        };

        let stamped = match composite(&decoded, &self.text, &self.style) {
            Ok(image) => image,
            Err(e) => {
                error!(source = %source.display(), error = %e, "failed to stamp image");
                return ImageOutcome::PublishFailed(e.to_string());
            }
        };

        match self.publisher.publish(&stamped) {
            Ok(artifact) => {
                info!(
                    source = %source.display(),
                    artifact = %artifact.path.display(),
                    "watermarked image published"
                );
                ImageOutcome::Published(artifact)
            }
            Err(e) => {
                error!(source = %source.display(), error = %e, "failed to publish image");
                ImageOutcome::PublishFailed(e.to_string())
            }
        }
    }
}
