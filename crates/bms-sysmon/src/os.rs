//! Services the supervisor consumes from the RTOS.
//!
//! The monitor never creates tasks or owns a timer. It needs a tick counter
//! and a way to make a short read-modify-write atomic with respect to the
//! other monitored tasks; both are provided by the scheduler port through
//! [`OsInterface`].

/// Scheduler services used by the supervisor.
///
/// # Real-Time Safety
///
/// Both methods are called from real-time task contexts. Implementations
/// must be bounded-time and must not sleep.
///
/// # Implementation Requirements
///
/// 1. `tick_count()` MUST increase monotonically modulo 2^32
/// 2. `with_task_critical()` MUST exclude every other monitored task while
///    `f` runs, MUST nest safely and MUST release on every exit path of `f`
pub trait OsInterface: Send + Sync {
    /// Current scheduler tick count.
    ///
    /// The counter wraps at 2^32; callers use wrapping arithmetic.
    fn tick_count(&self) -> u32;

    /// Run `f` inside a task-level critical section.
    fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R;
}

impl<T: OsInterface> OsInterface for &T {
    fn tick_count(&self) -> u32 {
        (**self).tick_count()
    }

    fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R {
        (**self).with_task_critical(f)
    }
}

impl<T: OsInterface> OsInterface for std::sync::Arc<T> {
    fn tick_count(&self) -> u32 {
        (**self).tick_count()
    }

    fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R {
        (**self).with_task_critical(f)
    }
}
