//! Host stand-in for the RTOS tick and task-level critical section.

use bms_sysmon::OsInterface;
use parking_lot::ReentrantMutex;
use std::time::Instant;

/// One tick per elapsed millisecond, starting at a configurable offset.
///
/// The critical section is a process-wide reentrant lock, so nested
/// sections taken by the same thread do not deadlock.
#[derive(Debug)]
pub struct SimulatedOs {
    started: Instant,
    start_tick: u32,
    critical: ReentrantMutex<()>,
}

impl SimulatedOs {
    pub fn new(start_tick: u32) -> Self {
        Self {
            started: Instant::now(),
            start_tick,
            critical: ReentrantMutex::new(()),
        }
    }
}

impl OsInterface for SimulatedOs {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the tick counter wraps at 2^32"
    )]
    fn tick_count(&self) -> u32 {
        let elapsed_ms = self.started.elapsed().as_millis() as u32;
        self.start_tick.wrapping_add(elapsed_ms)
    }

    fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.critical.lock();
        f()
    }
}
