//! Gallery queries over the watermark directory.
//!
//! The filesystem is the gallery: every finished artifact is a `.jpg` file
//! whose name carries the `-watermarked_` marker. Pending reservations use
//! a `.pending` extension and therefore never match the query. Listing is
//! newest-first by modification time.

use crate::constants::{ARTIFACT_EXTENSION, WATERMARK_MARKER};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors raised by gallery operations.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to read gallery directory {}: {}", dir.display(), message)]
    List { dir: PathBuf, message: String },

    #[error("{} is not a watermark artifact", path.display())]
    NotAnArtifact { path: PathBuf },

    #[error("Failed to delete {}: {}", path.display(), message)]
    Delete { path: PathBuf, message: String },
}

/// One row of the gallery listing.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryEntry {
    pub path: PathBuf,
    pub display_name: String,
    pub modified: DateTime<Utc>,
}

/// Whether a file name denotes a finished artifact.
///
/// Pending reservations end in `.pending` and fail the extension check.
pub fn is_artifact_name(name: &str) -> bool {
    name.contains(WATERMARK_MARKER) && name.ends_with(&format!(".{}", ARTIFACT_EXTENSION))
}

/// List finished artifacts in `dir`, newest first.
///
/// A missing directory lists as empty rather than erroring: a gallery that
/// has never received a publish simply has nothing to show.
pub fn list_artifacts(dir: &Path) -> Result<Vec<GalleryEntry>, GalleryError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| GalleryError::List {
        dir: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut rows = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_artifact_name(name) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!(file = name, error = %e, "skipping artifact with unreadable metadata");
                continue;
            }
        };

        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH);

        rows.push(GalleryEntry {
            path: entry.path(),
            display_name: name.to_string(),
            modified,
        });
    }

    // Newest first; name breaks ties so the order is stable
    rows.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.display_name.cmp(&a.display_name))
    });

    Ok(rows)
}

/// Delete one published artifact.
///
/// Refuses paths whose name does not carry the artifact marker, so the
/// caller cannot be pointed at arbitrary files.
pub fn remove_artifact(path: &Path) -> Result<(), GalleryError> {
    let is_artifact = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(is_artifact_name)
        .unwrap_or(false);

    if !is_artifact {
        return Err(GalleryError::NotAnArtifact {
            path: path.to_path_buf(),
        });
    }

    fs::remove_file(path).map_err(|e| GalleryError::Delete {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
