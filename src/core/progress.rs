//! Progress reporting.
//!
//! A side-channel sink for the pipeline's running byte count. Purely
//! presentational: attaching or omitting an observer never changes the
//! bytes a job produces.

use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar};

/// Sink for cumulative byte counts from the pipeline's write path.
pub trait ProgressObserver {
    /// Called after each chunk lands in the sink. `total` is monotonically
    /// non-decreasing within one job.
    fn on_bytes_written(&mut self, total: u64);
}

/// Spinner with a throttled, human-readable running byte count.
///
/// Draws to stderr. Only attached when the sink is a real file, so piped
/// binary output stays clean.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop ticking and clear the spinner line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for SpinnerProgress {
    fn on_bytes_written(&mut self, total: u64) {
        // indicatif throttles redraws; set_message on every chunk is cheap
        self.bar.set_message(format!("Writing {}...", HumanBytes(total)));
    }
}
