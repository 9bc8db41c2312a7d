//! Source directory scanning.
//!
//! Stage 1 of the pipeline. Lists the photos in a flat source directory:
//!
//! ```text
//! gallery/
//! ├── dawn.jpg          ✓ regular file
//! ├── cat.jpg -> ...    ✓ symlink to a regular file
//! ├── notes.txt         ✗ wrong extension
//! ├── DAWN.JPG          ✗ extension match is exact
//! ├── broken.jpg -> ✗   ✗ dangling link (skipped, logged)
//! └── thumbnails/       ✗ directories are never entered
//! ```
//!
//! Nothing is opened or decoded here. Results are sorted by file name so the
//! dispatch order is stable between runs.

use log::warn;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// The only extension the pipeline processes.
pub const PHOTO_EXTENSION: &str = "jpg";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("source is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("cannot list source directory {path}: {source}")]
    List {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Whether `path` carries the supported photo extension.
pub fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == PHOTO_EXTENSION)
}

/// List the photos directly inside `source_dir`.
///
/// Fails only when the directory itself cannot be listed. An unreadable
/// individual entry is logged and skipped.
pub fn scan(source_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !source_dir.is_dir() {
        return Err(ScanError::NotADirectory(source_dir.to_path_buf()));
    }

    let mut photos = Vec::new();
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::List {
                    path: source_dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_photo(entry.path()) {
            photos.push(entry.into_path());
        }
    }

    Ok(photos)
}
