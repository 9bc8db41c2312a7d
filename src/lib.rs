//! # khgallery
//!
//! Thumbnails a flat directory of photographs and renders a single gallery
//! page from them. The source directory is usually a set of symlinks into a
//! photo library; where each link points decides the photo's collection.
//!
//! # Architecture: Concurrent Ingestion Pipeline
//!
//! ```text
//! 1. Scan       gallery/*.jpg   →  Vec<PathBuf>        (sorted, non-recursive)
//! 2. Process    one rayon task per file → thumbnail + PhotoRecord
//! 3. Collect    mpsc channel → single collector thread → Manifest
//! 4. Finalize   shuffle once (random or seeded)
//! 5. Render     Manifest → gallery.md (or JSON), written once
//! ```
//!
//! Stages 2 and 3 run concurrently. The rayon scope is the barrier for the
//! workers; joining the collector after dropping the last sender is the
//! barrier for the results. Nothing downstream starts before both.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: lists `.jpg` files in the source directory |
//! | [`process`] | Stage 2: decode, plan, resize, atomic thumbnail write, record |
//! | [`collect`] | Stage 3: tagged worker outcomes and the collector thread |
//! | [`finalize`] | Stage 4: manifest shuffle |
//! | [`render`] | Stage 5: `Renderer` trait, gallery page and JSON renderers, output writer |
//! | [`pipeline`] | Wires the stages together, owns the worker pool and barrier |
//! | [`config`] | Layered `khgallery.toml` loading and validation |
//! | [`types`] | `PhotoRecord` and `Manifest` |
//! | [`metadata`] | Collection resolution through symlinks, slugs |
//! | [`imaging`] | `ImageBackend` seam, thumbnail geometry, pure-Rust backend |
//! | [`signal`] | Ctrl-C → shutdown flag |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Per-Photo Failure Isolation
//!
//! A corrupt or unsupported file produces a `Failed` outcome and a warning;
//! its siblings and the rest of the build are unaffected. Only conditions that
//! make the whole run meaningless (unlistable source, uncreatable thumbnail
//! directory, render or output failure) stop the build.
//!
//! ## Single Writer for the Manifest
//!
//! Workers never share mutable state. Each sends one outcome over a channel
//! and the collector thread is the only code that appends to the manifest, so
//! there is no lock to get wrong and no lost update.
//!
//! ## Atomic Thumbnails
//!
//! Thumbnails are encoded into a temp file beside the destination and renamed
//! into place. A crash or encode error never leaves a half-written JPEG under
//! the final name.

pub mod collect;
pub mod config;
pub mod finalize;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod scan;
pub mod signal;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
