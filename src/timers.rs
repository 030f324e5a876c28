//! RAII phase timing for the resolution pipeline.

use std::time::{Duration, Instant};

/// Adds the time between its creation and its drop to a `Duration` slot.
///
/// ```rust,ignore
/// let mut compile = Duration::ZERO;
/// let condition = {
///     let _timer = PhaseTimer::new(&mut compile);
///     compiler::compile(&paths, &column)?
/// };
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// Duration in fractional milliseconds, as reported in phase metrics.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
