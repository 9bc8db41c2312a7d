//! Gallery document rendering.
//!
//! Stage 4 of the pipeline. A [`Renderer`] turns the finalized manifest into
//! a single document; [`write_output`] puts it on disk. Both run exactly once
//! per successful build, after every worker has finished.
//!
//! ## Gallery page
//!
//! [`GalleryPageRenderer`] emits a markdown page for a static site generator:
//!
//! ```text
//! ---
//! title: "Test Gallery"
//! date: 2024-03-01 09:05:00
//! ---
//!
//! <div class="gallery">
//!   <div class="gallery-filters">  one button per collection  </div>
//!   <div class="gallery-grid">     one item per photo         </div>
//! </div>
//! ```
//!
//! Each grid item links the original at `<deploy_href><filename>` and shows
//! the thumbnail at `<deploy_href><thumbnails_dir>/<filename>`. Width and
//! height are exposed as `data-pswp-*` attributes for the lightbox script.
//!
//! HTML is generated with maud, so every interpolated value is escaped.

use crate::config::{GalleryConfig, OutputFormat};
use crate::metadata::slug;
use crate::types::{Manifest, PhotoRecord};
use maud::{Markup, html};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot encode front matter: {0}")]
    FrontMatter(#[source] serde_json::Error),
    #[error("cannot encode manifest as JSON: {0}")]
    Json(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
#[error("cannot write output {path}: {source}")]
pub struct OutputError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Input handed to a [`Renderer`].
pub struct RenderContext<'a> {
    pub manifest: &'a Manifest,
    pub slug: fn(&str) -> String,
    /// URL prefix of the deployed source directory, with trailing `/`.
    pub deploy_href: &'a str,
    /// Thumbnail directory relative to `deploy_href`, without trailing `/`.
    pub thumbnails_dir: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(manifest: &'a Manifest, config: &'a GalleryConfig) -> Self {
        Self {
            manifest,
            slug,
            deploy_href: &config.gallery.deploy_href,
            thumbnails_dir: config.thumbnails_dir.trim_end_matches('/'),
        }
    }

    fn original_href(&self, photo: &PhotoRecord) -> String {
        format!("{}{}", self.deploy_href, photo.filename())
    }

    fn thumbnail_href(&self, photo: &PhotoRecord) -> String {
        format!(
            "{}{}/{}",
            self.deploy_href,
            self.thumbnails_dir,
            photo.filename()
        )
    }
}

/// Turns a finalized manifest into a document.
pub trait Renderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, RenderError>;
}

/// Renderer matching the configured output format.
pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Markdown => Box::new(GalleryPageRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

// =============================================================================
// Markdown gallery page
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct GalleryPageRenderer;

impl Renderer for GalleryPageRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
        let title =
            serde_json::to_string(&ctx.manifest.name).map_err(RenderError::FrontMatter)?;
        let body = gallery_body(ctx);
        Ok(format!(
            "---\ntitle: {}\ndate: {}\n---\n\n{}\n",
            title,
            ctx.manifest.generated_at_display(),
            body.into_string()
        ))
    }
}

/// Distinct collections keyed by slug, so buttons come out sorted and unique.
fn collections(ctx: &RenderContext<'_>) -> BTreeMap<String, String> {
    ctx.manifest
        .photos
        .iter()
        .map(|p| ((ctx.slug)(p.collection_name()), p.collection_name().to_string()))
        .collect()
}

fn item_class(ctx: &RenderContext<'_>, photo: &PhotoRecord) -> String {
    let mut class = format!("gallery-item {}", (ctx.slug)(photo.collection_name()));
    if photo.is_panorama() {
        class.push_str(" panorama");
    }
    class
}

fn gallery_body(ctx: &RenderContext<'_>) -> Markup {
    html! {
        div.gallery {
            div.gallery-filters {
                button.filter.active data-filter="*" { "All" }
                @for (key, name) in collections(ctx) {
                    button.filter data-filter=(key) { (name) }
                }
            }
            div.gallery-grid {
                @for photo in &ctx.manifest.photos {
                    div class=(item_class(ctx, photo)) {
                        a href=(ctx.original_href(photo))
                            data-pswp-width=(photo.width())
                            data-pswp-height=(photo.height())
                            target="_blank" {
                            img src=(ctx.thumbnail_href(photo))
                                alt=(photo.filename())
                                loading="lazy";
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// JSON manifest
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
        let mut json = serde_json::to_string_pretty(ctx.manifest).map_err(RenderError::Json)?;
        json.push('\n');
        Ok(json)
    }
}

// =============================================================================
// Output
// =============================================================================

/// Write `rendered` to `path`, creating parent directories as needed.
///
/// The data is flushed and synced before returning so a reported success
/// means the document is fully on disk.
pub fn write_output(path: &Path, rendered: &str) -> Result<(), OutputError> {
    let err = |source| OutputError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(err)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path).map_err(err)?);
    writer.write_all(rendered.as_bytes()).map_err(err)?;
    let file = writer.into_inner().map_err(|e| err(e.into_error()))?;
    file.sync_all().map_err(err)?;
    Ok(())
}
