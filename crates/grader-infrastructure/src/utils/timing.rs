//! Timing instrumentation helpers

use std::time::{Duration, Instant};

/// Tracks elapsed time of an operation
///
/// ```
/// use grader_infrastructure::utils::TimedOperation;
///
/// let timer = TimedOperation::start();
/// assert!(timer.elapsed_ms() < 60_000);
/// ```
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    /// Start timing
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Elapsed time as Duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
