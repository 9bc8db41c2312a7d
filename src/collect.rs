//! Result intake.
//!
//! Workers never touch the [`Manifest`]. Each one sends exactly one
//! [`WorkerOutcome`] down a channel, and a single collector thread owns the
//! manifest and appends to it:
//!
//! ```text
//! worker 1 ─┐
//! worker 2 ─┼──► mpsc channel ──► collector thread ──► Collected
//! worker N ─┘                     (sole writer)
//! ```
//!
//! The collector stops when every sender has been dropped, which is what makes
//! [`Collector::wait`] a reliable "all results are in" signal: the caller drops
//! its own sender after the dispatch barrier, then joins.

use crate::process::ProcessError;
use crate::types::{Manifest, PhotoRecord};
use log::info;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// What one unit of work produced.
#[derive(Debug)]
pub enum WorkerOutcome {
    Processed(PhotoRecord),
    Failed { filename: String, error: ProcessError },
    /// Never started because shutdown was requested.
    Skipped { filename: String },
}

/// A photo that did not make it into the manifest.
#[derive(Debug)]
pub struct Failure {
    pub filename: String,
    pub error: ProcessError,
}

/// Everything the collector accumulated.
#[derive(Debug)]
pub struct Collected {
    pub manifest: Manifest,
    pub failures: Vec<Failure>,
    pub skipped: Vec<String>,
}

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("cannot start collector thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("collector thread panicked")]
    Panicked,
}

/// Handle to the running collector thread.
pub struct Collector {
    handle: JoinHandle<Collected>,
}

impl Collector {
    /// Start collecting into `manifest` until every sender for `intake` is gone.
    pub fn spawn(manifest: Manifest, intake: Receiver<WorkerOutcome>) -> Result<Self, CollectorError> {
        let handle = thread::Builder::new()
            .name("collector".to_string())
            .spawn(move || collect(manifest, intake))
            .map_err(CollectorError::Spawn)?;
        Ok(Self { handle })
    }

    /// Block until the intake closes and hand back the accumulated results.
    pub fn wait(self) -> Result<Collected, CollectorError> {
        self.handle.join().map_err(|_| CollectorError::Panicked)
    }
}

/// Drain `intake` into `manifest`. Runs on the collector thread.
pub fn collect(mut manifest: Manifest, intake: Receiver<WorkerOutcome>) -> Collected {
    let mut failures = Vec::new();
    let mut skipped = Vec::new();

    for outcome in intake {
        match outcome {
            WorkerOutcome::Processed(record) => {
                info!("found image: {}", record.filename());
                manifest.push(record);
            }
            WorkerOutcome::Failed { filename, error } => {
                failures.push(Failure { filename, error });
            }
            WorkerOutcome::Skipped { filename } => skipped.push(filename),
        }
    }

    Collected {
        manifest,
        failures,
        skipped,
    }
}
