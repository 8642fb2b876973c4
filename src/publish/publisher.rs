//! Two-phase artifact publication.
//!
//! A publish runs in two phases so that a concurrent reader can never
//! observe a half-written file:
//!
//! 1. **Reserve**: exclusively create `<name>.jpg.pending`. The `.pending`
//!    extension is the pending flag - the gallery query only admits `.jpg`
//!    names, so a reservation is invisible by construction. The display
//!    name carries a millisecond timestamp; on collision the timestamp is
//!    bumped and reservation retried.
//! 2. **Write + finalize**: encode the image as JPEG into the pending file,
//!    flush and fsync, then atomically rename to the final `.jpg` name.
//!    The rename is the publication point.
//!
//! Any failure after reservation removes the pending file before the error
//! is returned, so a failed publish leaves no orphaned slot behind.

use super::error::PublishError;
use crate::config::OutputConfig;
use crate::constants::{
    ARTIFACT_EXTENSION, MAX_RESERVE_ATTEMPTS, PENDING_EXTENSION, WATERMARK_MARKER,
};
use chrono::Utc;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage, RgbaImage};
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A finished, externally visible artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    /// Absolute path of the published file.
    pub path: PathBuf,
    /// File name, `<namespace>-watermarked_<millis>.jpg`.
    pub display_name: String,
}

/// A reserved-but-incomplete artifact slot.
struct ReservedSlot {
    display_name: String,
    pending_path: PathBuf,
    file: File,
}

/// Publishes composited images into the watermark directory.
#[derive(Debug, Clone)]
pub struct Publisher {
    dir: PathBuf,
    namespace: String,
    quality: u8,
}

impl Publisher {
    pub fn new(dir: impl Into<PathBuf>, namespace: impl Into<String>, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            namespace: namespace.into(),
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_output_config(output: &OutputConfig) -> Self {
        Self::new(
            output.watermark_dir(),
            output.namespace.clone(),
            output.jpeg_quality,
        )
    }

    /// The directory published artifacts land in.
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Publish one composited image.
    ///
    /// On success a new `.jpg` artifact exists in the watermark directory
    /// and is visible to the gallery query. On failure no pending file
    /// remains.
    pub fn publish(&self, image: &RgbaImage) -> Result<PublishedArtifact, PublishError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            PublishError::Reserve(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let slot = self.reserve_slot()?;
        debug!(slot = %slot.pending_path.display(), "reserved artifact slot");

        if let Err(e) = write_jpeg(slot.file, image, self.quality) {
            let _ = fs::remove_file(&slot.pending_path);
            return Err(e);
        }

        let final_path = self.dir.join(&slot.display_name);
        if let Err(e) = fs::rename(&slot.pending_path, &final_path) {
            let _ = fs::remove_file(&slot.pending_path);
            return Err(PublishError::Finalize(format!(
                "cannot rename {} into place: {}",
                slot.pending_path.display(),
                e
            )));
        }

        info!(artifact = %final_path.display(), "published watermarked image");

        Ok(PublishedArtifact {
            path: final_path,
            display_name: slot.display_name,
        })
    }

    /// Reserve a uniquely named slot via exclusive file creation.
    ///
    /// Timestamps have millisecond resolution, so two publishes in the same
    /// millisecond (or a leftover file from an earlier run) can collide;
    /// each retry bumps the suffix by one.
    fn reserve_slot(&self) -> Result<ReservedSlot, PublishError> {
        let base = Utc::now().timestamp_millis();

        for attempt in 0..MAX_RESERVE_ATTEMPTS {
            let stamp = base + attempt as i64;
            let display_name = format!(
                "{}{}{}.{}",
                self.namespace, WATERMARK_MARKER, stamp, ARTIFACT_EXTENSION
            );

            let final_path = self.dir.join(&display_name);
            if final_path.exists() {
                continue;
            }

            let pending_path = self
                .dir
                .join(format!("{}.{}", display_name, PENDING_EXTENSION));

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&pending_path)
            {
                Ok(file) => {
                    return Ok(ReservedSlot {
                        display_name,
                        pending_path,
                        file,
                    })
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(PublishError::Reserve(e.to_string())),
            }
        }

        Err(PublishError::Reserve(format!(
            "no free artifact name after {} attempts",
            MAX_RESERVE_ATTEMPTS
        )))
    }
}

/// Encode `image` as JPEG into the reserved file and make it durable.
fn write_jpeg(file: File, image: &RgbaImage, quality: u8) -> Result<(), PublishError> {
    // JPEG carries no alpha channel
    let rgb: RgbImage = image.convert();

    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| PublishError::Encode(e.to_string()))?;

    let file = writer
        .into_inner()
        .map_err(|e| PublishError::Write(e.to_string()))?;
    file.sync_all()
        .map_err(|e| PublishError::Write(e.to_string()))?;

    Ok(())
}
