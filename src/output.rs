//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! gallery/
//! 001 dawn.jpg
//!     Collection: Iceland 2023
//! 002 local.jpg
//!     Collection: (default)
//!
//! 2 photos to process
//! ```
//!
//! ## Build
//!
//! ```text
//! Processed 6 of 9 photos
//! Failed 3
//!     bad-0.jpg: decode failed: ...
//! Skipped 0
//!
//! Gallery written to gallery.md
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::pipeline::BuildReport;
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

// ============================================================================
// check
// ============================================================================

/// One scanned photo and the collection it would be filed under.
#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub path: PathBuf,
    pub collection: String,
}

/// Format the photos a build would dispatch.
pub fn format_check_output(entries: &[CheckEntry], source_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!("{}/", source_dir.display())];

    for (i, entry) in entries.iter().enumerate() {
        let name = entry
            .path
            .strip_prefix(source_dir)
            .unwrap_or(&entry.path)
            .display();
        lines.push(format!("{} {}", format_index(i + 1), name));
        lines.push(format!("{}Collection: {}", indent(1), entry.collection));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} to process",
        plural(entries.len(), "photo", "photos")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(entries: &[CheckEntry], source_dir: &Path) {
    for line in format_check_output(entries, source_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the end-of-build summary.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Processed {} of {}",
        report.processed,
        plural(report.scanned, "photo", "photos")
    )];

    lines.push(format!("Failed {}", report.failures.len()));
    for failure in &report.failures {
        lines.push(format!("{}{}: {}", indent(1), failure.filename, failure.error));
    }

    lines.push(format!("Skipped {}", report.skipped.len()));
    for name in &report.skipped {
        lines.push(format!("{}{}", indent(1), name));
    }

    lines.push(String::new());
    lines.push(format!(
        "Gallery written to {}",
        report.output_path.display()
    ));
    lines
}

/// Print the build summary to stdout.
pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}
