//! Ctrl-C handling for long builds.

use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Install a Ctrl-C handler and return the flag it raises.
///
/// Workers that have not started yet see the flag and skip their photo;
/// workers already running finish normally.
pub fn setup_shutdown_signal() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        warn!("interrupt received, finishing in-flight photos");
    })?;

    Ok(shutdown_signal)
}
