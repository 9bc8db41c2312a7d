//! Per-photo metadata that does not come from pixels.
//!
//! ## Collections
//!
//! A gallery directory is usually a flat set of symlinks into the photo
//! library, so the *real* location of each file tells us where it came from:
//!
//! ```text
//! gallery/
//! ├── dawn.jpg -> ~/Photos/Iceland 2023/dawn.jpg   → collection "Iceland 2023"
//! ├── cat.jpg  -> ~/Photos/Home/cat.jpg            → collection "Home"
//! └── local.jpg                                    → collection "(default)"
//! ```
//!
//! Resolution never fails a photo: plain files, dangling links, and links whose
//! target has no parent all fall back to [`DEFAULT_COLLECTION`].

use crate::types::DEFAULT_COLLECTION;
use log::debug;
use std::fs;
use std::path::Path;

/// Collection label for `path`.
pub fn resolve_collection(path: &Path) -> String {
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return DEFAULT_COLLECTION.to_string();
    }

    match fs::canonicalize(path) {
        Ok(real) => real
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        Err(e) => {
            debug!("cannot resolve link {}: {}", path.display(), e);
            DEFAULT_COLLECTION.to_string()
        }
    }
}

/// URL/CSS-class slug: lower-cased, spaces replaced with `-`.
pub fn slug(name: &str) -> String {
    name.replace(' ', "-").to_lowercase()
}
