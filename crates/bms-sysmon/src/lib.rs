//! # bms-sysmon
//!
//! Deadline supervision of the real-time tasks of the BMS controller.
//!
//! Every monitored task reports when it starts and finishes a cycle. A
//! periodic checker compares the ticks elapsed since each task's most recent
//! start with the task's cycle time plus allowed jitter. Late tasks are
//! escalated to the diagnostic handler and, where configured, stored in a
//! violation record that is persisted to FRAM and survives resets.
//!
//! ## Safety Guarantees
//!
//! - **No heap allocations** in `notify` and `check_notifications`
//! - **No blocking** in the instrumentation path beyond the task-level
//!   critical section supplied by the scheduler
//! - **Wraparound-safe** tick arithmetic everywhere
//! - **Contract violations never return**: they are routed to a
//!   [`FatalHandler`] before any state is touched
//!
//! ## Architecture
//!
//! - [`task`] - Monitored task identifiers and notification events
//! - [`notification`] - Lock-free per-task notification registry
//! - [`config`] - Channel configuration and validation
//! - [`monitor`] - The supervisor context tying everything together
//! - [`record`] - Persisted violation record and query response
//! - [`fram`] - Storage engine contract
//! - [`os`] - Scheduler services contract
//! - [`fatal`] - Contract-violation abort path
//! - [`error`] - Recoverable error types
//!
//! ## Example
//!
//! ```rust
//! use bms_sysmon::{DiagHandler, DiagHandlerReturn, DiagReport};
//! use bms_sysmon::prelude::*;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct Ticks(AtomicU32);
//!
//! impl OsInterface for Ticks {
//!     fn tick_count(&self) -> u32 {
//!         self.0.load(Ordering::Relaxed)
//!     }
//!
//!     fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R {
//!         f()
//!     }
//! }
//!
//! struct IgnoreDiag;
//!
//! impl DiagHandler for IgnoreDiag {
//!     fn handle(&self, _report: DiagReport) -> DiagHandlerReturn {
//!         DiagHandlerReturn::Ok
//!     }
//! }
//!
//! let monitor = SystemMonitor::new(
//!     ChannelTable::controller_default(),
//!     Ticks(AtomicU32::new(120)),
//!     IgnoreDiag,
//! );
//!
//! monitor.notify(TaskId::Cyclic10ms, NotifyEvent::Enter, 100);
//! let summary = monitor.check_notifications();
//! assert_eq!(summary.violations, 1);
//! assert!(monitor.recorded_timing_violations().recorded_violation_10ms);
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod fatal;
pub mod fram;
pub mod monitor;
pub mod notification;
pub mod os;
pub mod record;
pub mod task;

pub mod prelude;

pub use config::{
    ChannelConfig, ChannelConfigBuilder, ChannelSpec, ChannelTable, HandlingAction,
    ViolationCallback,
};
pub use error::{SysMonError, SysMonResult};
pub use fatal::{ContractViolation, FatalHandler, HaltOnViolation};
pub use fram::{FramBlockId, FramError, FramResult, FramStore};
pub use monitor::{CheckSummary, SystemMonitor};
pub use notification::{Notification, NotificationRegistry, TaskPhase, tick_delta};
pub use os::OsInterface;
pub use record::{TaskTimingRecord, ViolationRecord, ViolationResponse};
pub use task::{MAX_TASKS, NotifyEvent, TaskId};

// Re-export the diagnostic contract for convenience
pub use bms_diag::{DiagHandler, DiagHandlerReturn, DiagReport};
