use std::time::{Duration, Instant};

use tracing::debug;

/// Wall-clock timer for a named preparation or query phase.
pub(crate) struct Stopwatch {
    phase: &'static str,
    started_at: Instant,
}

impl Stopwatch {
    pub(crate) fn start(phase: &'static str) -> Self {
        Stopwatch {
            phase,
            started_at: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Logs the elapsed time of the phase at debug level and returns it.
    pub(crate) fn report(&self) -> Duration {
        let elapsed = self.elapsed();
        debug!(
            phase = self.phase,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "phase finished"
        );
        elapsed
    }
}
