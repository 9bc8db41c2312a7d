//! Build orchestration.
//!
//! Wires the stages together and owns the concurrency:
//!
//! ```text
//! scan ──► create thumbnails dir ──► ingest ──────────────────────► finalize ──► render ──► write
//!                                      │                         ▲
//!                                      ├─ rayon scope: 1 task/file
//!                                      │    └─ WorkerOutcome ──► mpsc ──► collector thread
//!                                      └─ scope returns (barrier), drop sender, join collector
//! ```
//!
//! ## Completion
//!
//! [`ingest`] returns only after two things have happened, in order: the rayon
//! scope has seen every task terminate, and the collector has drained the
//! channel and exited. Rendering therefore always sees every outcome.
//!
//! ## Failure isolation
//!
//! Per-photo errors become [`WorkerOutcome::Failed`] and are counted; they never
//! cancel siblings or abort the build. Only the stage-level conditions in
//! [`BuildError`] are fatal.

use crate::collect::{Collected, Collector, CollectorError, Failure, WorkerOutcome};
use crate::config::{GalleryConfig, effective_workers};
use crate::finalize::{ShuffleOrder, finalize};
use crate::imaging::ImageBackend;
use crate::process::{ProcessError, ThumbnailSettings, process_photo};
use crate::render::{OutputError, RenderContext, RenderError, Renderer, write_output};
use crate::scan::{ScanError, scan};
use crate::types::Manifest;
use chrono::Local;
use log::{debug, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("cannot create thumbnails directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("thumbnails directory {path} is the source directory; thumbnails would overwrite originals")]
    ThumbnailsOverwriteSource { path: PathBuf },
    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Collector(#[from] CollectorError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("build interrupted: {processed} processed, {skipped} skipped, nothing rendered")]
    Cancelled { processed: usize, skipped: usize },
}

/// What a successful build did.
#[derive(Debug)]
pub struct BuildReport {
    pub scanned: usize,
    pub processed: usize,
    pub failures: Vec<Failure>,
    pub skipped: Vec<String>,
    pub output_path: PathBuf,
}

/// Run the full pipeline: scan, thumbnail, collect, shuffle, render, write.
pub fn build<B, R>(
    config: &GalleryConfig,
    backend: &B,
    renderer: &R,
    shutdown: &AtomicBool,
) -> Result<BuildReport, BuildError>
where
    B: ImageBackend,
    R: Renderer + ?Sized,
{
    let files = scan(&config.source_dir)?;
    info!(
        "scanned {} photo(s) in {}",
        files.len(),
        config.source_dir.display()
    );

    let thumbnails_path = config.thumbnails_path();
    std::fs::create_dir_all(&thumbnails_path).map_err(|source| BuildError::DirectoryCreate {
        path: thumbnails_path.clone(),
        source,
    })?;
    if same_directory(&thumbnails_path, &config.source_dir)? {
        return Err(BuildError::ThumbnailsOverwriteSource {
            path: thumbnails_path,
        });
    }

    let settings = ThumbnailSettings::from_config(config);
    let workers = effective_workers(&config.processing);
    let manifest = Manifest::new(&config.gallery.name, Local::now().naive_local());

    let collected = ingest(backend, &files, &settings, workers, shutdown, manifest)?;
    if shutdown.load(Ordering::SeqCst) {
        return Err(BuildError::Cancelled {
            processed: collected.manifest.len(),
            skipped: collected.skipped.len(),
        });
    }

    let Collected {
        manifest,
        failures,
        skipped,
    } = collected;
    let processed = manifest.len();
    let manifest = finalize(manifest, ShuffleOrder::from_seed(config.processing.seed));

    let rendered = renderer.render(&RenderContext::new(&manifest, config))?;
    write_output(&config.output_path, &rendered)?;
    info!("gallery written to {}", config.output_path.display());

    Ok(BuildReport {
        scanned: files.len(),
        processed,
        failures,
        skipped,
        output_path: config.output_path.clone(),
    })
}

/// Whether both paths resolve to the same directory once `.`, `..` and
/// symlinks are followed.
fn same_directory(thumbnails: &Path, source: &Path) -> Result<bool, BuildError> {
    let resolve = |path: &Path| {
        std::fs::canonicalize(path).map_err(|source| BuildError::DirectoryCreate {
            path: path.to_path_buf(),
            source,
        })
    };
    Ok(resolve(thumbnails)? == resolve(source)?)
}

/// Thumbnail every file on a pool of `workers` threads and collect the results
/// into `manifest`.
///
/// Returns after every dispatched unit has terminated and the collector has
/// drained all outcomes.
pub fn ingest<B: ImageBackend>(
    backend: &B,
    files: &[PathBuf],
    settings: &ThumbnailSettings,
    workers: usize,
    shutdown: &AtomicBool,
    manifest: Manifest,
) -> Result<Collected, BuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("thumbnail-{i}"))
        .build()?;

    let (intake, outcomes) = mpsc::channel();
    let collector = Collector::spawn(manifest, outcomes)?;

    info!("processing {} photo(s) with {} worker(s)", files.len(), workers);
    pool.scope(|scope| {
        for file in files {
            let intake = intake.clone();
            if shutdown.load(Ordering::SeqCst) {
                let _ = intake.send(WorkerOutcome::Skipped {
                    filename: display_name(file),
                });
                continue;
            }
            debug!("dispatching {}", file.display());
            scope.spawn(move |_| run_unit(backend, file, settings, shutdown, &intake));
        }
    });

    drop(intake);
    Ok(collector.wait()?)
}

/// One unit of work. Sends exactly one outcome, even if processing panics.
fn run_unit<B: ImageBackend>(
    backend: &B,
    file: &Path,
    settings: &ThumbnailSettings,
    shutdown: &AtomicBool,
    intake: &Sender<WorkerOutcome>,
) {
    let filename = display_name(file);
    let outcome = if shutdown.load(Ordering::SeqCst) {
        WorkerOutcome::Skipped { filename }
    } else {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            process_photo(backend, file, settings)
        }));
        let result =
            attempt.unwrap_or_else(|payload| Err(ProcessError::Panicked(panic_message(payload))));
        match result {
            Ok(record) => WorkerOutcome::Processed(record),
            Err(error) => {
                warn!("{}: {}", filename, error);
                WorkerOutcome::Failed { filename, error }
            }
        }
    };
    // The receiver lives until every sender is dropped.
    let _ = intake.send(outcome);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
