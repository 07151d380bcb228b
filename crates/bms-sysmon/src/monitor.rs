//! The supervisor context: instrumentation, deadline checking and record
//! management for one controller.
//!
//! A [`SystemMonitor`] owns the notification registry and the in-memory
//! violation record and borrows its collaborators (scheduler, diagnostic
//! handler, fatal hook) as type parameters. There is no global state; tests
//! build as many independent monitors as they need.

use core::panic::Location;
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use serde::{Deserialize, Serialize};

use bms_diag::{DiagHandler, DiagId, DiagImpact, DiagReport};

use crate::config::{ChannelConfig, ChannelTable};
use crate::fatal::{ContractViolation, FatalHandler, HaltOnViolation};
use crate::fram::{FramBlockId, FramResult, FramStore};
use crate::notification::{Notification, NotificationRegistry, TaskPhase};
use crate::os::OsInterface;
use crate::record::{ViolationRecord, ViolationResponse};
use crate::task::{NotifyEvent, TaskId};

/// Result of one deadline check pass.
///
/// A pass skipped because the tick has not moved since the previous pass
/// reports zero evaluated channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Tick sampled at the start of the pass.
    pub now: u32,
    /// Channels that were enabled and not idle.
    pub evaluated: usize,
    /// Channels found in violation.
    pub violations: usize,
}

impl CheckSummary {
    /// True if the pass escalated nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }
}

/// Task deadline supervisor.
///
/// # Thread Safety
///
/// All operations take `&self`. Registry writes are serialised through
/// [`OsInterface::with_task_critical`]; the checker reads slots without
/// locking. The violation record sits behind a `parking_lot::Mutex` held
/// only for the copy in or out; no storage I/O happens under it.
///
/// # RT Safety
///
/// The following methods are RT-safe (no allocations, bounded time):
/// - `notify()` / `notify_raw()`
/// - `check_notifications()`, provided the diagnostic handler and the
///   channel callbacks are RT-safe themselves
/// - `get_recorded_timing_violations()` / `recorded_timing_violations()`
///
/// Recording a violation can wait on the record lock while a management
/// call (`update_fram_data`, `restore_from_fram`,
/// `clear_all_timing_violations`, a snapshot accessor) copies the
/// 11-field record in or out. The wait is bounded by that copy.
pub struct SystemMonitor<O, D, F = HaltOnViolation> {
    channels: ChannelTable,
    registry: NotificationRegistry,
    record: Mutex<ViolationRecord>,
    unsaved: AtomicBool,
    last_check: AtomicU32,
    os: O,
    diag: D,
    fatal: F,
}

impl<O: OsInterface, D: DiagHandler> SystemMonitor<O, D> {
    /// Create a monitor that halts on contract violations.
    #[must_use]
    pub fn new(channels: ChannelTable, os: O, diag: D) -> Self {
        Self::with_fatal_handler(channels, os, diag, HaltOnViolation)
    }
}

impl<O: OsInterface, D: DiagHandler, F: FatalHandler> SystemMonitor<O, D, F> {
    /// Create a monitor with a custom contract-violation handler.
    #[must_use]
    pub fn with_fatal_handler(channels: ChannelTable, os: O, diag: D, fatal: F) -> Self {
        Self {
            channels,
            registry: NotificationRegistry::new(),
            record: Mutex::new(ViolationRecord::new()),
            unsaved: AtomicBool::new(false),
            last_check: AtomicU32::new(0),
            os,
            diag,
            fatal,
        }
    }

    /// Record an enter or exit of `task` at `timestamp`.
    ///
    /// Enter stores the enter tick. Exit stores the exit tick and the
    /// wrapping duration since the stored enter tick.
    pub fn notify(&self, task: TaskId, event: NotifyEvent, timestamp: u32) {
        self.os
            .with_task_critical(|| self.registry.record(task, event, timestamp));
    }

    /// Instrumentation entry for raw task and event codes.
    ///
    /// An out-of-range task id is rejected before the critical section is
    /// entered; an unknown event code is rejected inside it. In both cases
    /// the fatal handler is invoked and the registry is left untouched.
    #[track_caller]
    pub fn notify_raw(&self, task_id: u8, event: u8, timestamp: u32) {
        let location = Location::caller();
        let Some(task) = TaskId::from_raw(task_id) else {
            self.fail_fatally(ContractViolation::InvalidTaskId { raw: task_id }, location);
            return;
        };

        self.os.with_task_critical(|| match NotifyEvent::from_raw(event) {
            Some(event) => self.registry.record(task, event, timestamp),
            None => self.fail_fatally(ContractViolation::InvalidEventKind { raw: event }, location),
        });
    }

    /// Evaluate every configured channel against the current tick.
    ///
    /// The tick is sampled once for the whole pass. A pass at the same tick
    /// as the previous pass returns without evaluating anything; the first
    /// pass compares against tick 0. Disabled channels and channels whose
    /// task has never reported are skipped. A channel is in violation when
    /// the ticks elapsed since its most recent enter exceed
    /// `cycle_time + max_jitter`.
    pub fn check_notifications(&self) -> CheckSummary {
        let now = self.os.tick_count();
        let mut summary = CheckSummary {
            now,
            ..CheckSummary::default()
        };

        if self.last_check.swap(now, Ordering::AcqRel) == now {
            tracing::trace!(now, "Tick unchanged since last check, skipping pass");
            return summary;
        }

        for channel in self.channels.iter() {
            if !channel.enabled {
                continue;
            }

            let notification = self.registry.get(channel.task);
            if notification.is_idle() {
                continue;
            }
            summary.evaluated = summary.evaluated.saturating_add(1);

            let elapsed = notification.elapsed_since_enter(now);
            if elapsed > channel.deadline() {
                summary.violations = summary.violations.saturating_add(1);
                self.escalate(channel, notification.timestamp_enter, elapsed);
            }
        }

        tracing::trace!(
            now = summary.now,
            evaluated = summary.evaluated,
            violations = summary.violations,
            "Deadline check pass finished"
        );
        summary
    }

    fn escalate(&self, channel: &ChannelConfig, enter_timestamp: u32, elapsed: u32) {
        let task = channel.task;
        let diag_status = self.diag.handle(DiagReport::not_ok(
            DiagId::SystemMonitoring,
            DiagImpact::System,
            u32::from(task.to_raw()),
        ));

        tracing::warn!(
            task = %task,
            elapsed = elapsed,
            limit = channel.deadline(),
            action = ?channel.handling_action,
            diag_status = ?diag_status,
            "Task deadline violated"
        );

        if channel.recording_enabled {
            self.record
                .lock()
                .record_violation(task, enter_timestamp, elapsed);
            self.unsaved.store(true, Ordering::Release);
        }

        if let Some(callback) = &channel.callback {
            callback(task);
        }
    }

    /// Persist the in-memory record under [`FramBlockId::SysMonRecord`].
    ///
    /// Writes unconditionally and returns the storage status unchanged.
    ///
    /// # Errors
    ///
    /// Returns the storage engine's write failure. The record stays marked
    /// as unsaved.
    pub fn update_fram_data<S: FramStore + ?Sized>(&self, fram: &mut S) -> FramResult<()> {
        self.unsaved.store(false, Ordering::Release);
        let snapshot = *self.record.lock();

        match fram.write(FramBlockId::SysMonRecord, &snapshot) {
            Ok(()) => {
                tracing::debug!(
                    any_timing_issue = snapshot.any_timing_issue_occurred,
                    "Violation record persisted"
                );
                Ok(())
            }
            Err(err) => {
                self.unsaved.store(true, Ordering::Release);
                tracing::debug!(error = %err, "Persisting violation record failed");
                Err(err)
            }
        }
    }

    /// Load the persisted record into memory.
    ///
    /// # Errors
    ///
    /// Returns the storage engine's read failure, including
    /// [`crate::FramError::BlockEmpty`]. The in-memory record is untouched.
    pub fn restore_from_fram<S: FramStore + ?Sized>(&self, fram: &mut S) -> FramResult<()> {
        let stored = fram.read(FramBlockId::SysMonRecord)?;
        self.record.lock().copy_from(&stored);
        self.unsaved.store(false, Ordering::Release);
        tracing::debug!(
            any_timing_issue = stored.any_timing_issue_occurred,
            "Violation record restored"
        );
        Ok(())
    }

    /// Zero the in-memory record and persist the cleared record.
    ///
    /// # Errors
    ///
    /// Returns the storage engine's write failure. The in-memory record is
    /// cleared regardless.
    pub fn clear_all_timing_violations<S: FramStore + ?Sized>(
        &self,
        fram: &mut S,
    ) -> FramResult<()> {
        self.record.lock().clear();
        self.update_fram_data(fram)
    }

    /// Copy every field of `source` into `destination`.
    ///
    /// A missing argument invokes the fatal handler and leaves
    /// `destination` unmodified.
    #[track_caller]
    pub fn copy_fram_struct(
        &self,
        source: Option<&ViolationRecord>,
        destination: Option<&mut ViolationRecord>,
    ) {
        let location = Location::caller();
        match (source, destination) {
            (None, _) => self.fail_fatally(ContractViolation::MissingCopySource, location),
            (Some(_), None) => {
                self.fail_fatally(ContractViolation::MissingCopyDestination, location);
            }
            (Some(source), Some(destination)) => destination.copy_from(source),
        }
    }

    /// Fill `response` from the in-memory record.
    ///
    /// A missing `response` invokes the fatal handler.
    #[track_caller]
    pub fn get_recorded_timing_violations(&self, response: Option<&mut ViolationResponse>) {
        let location = Location::caller();
        match response {
            Some(response) => *response = self.recorded_timing_violations(),
            None => self.fail_fatally(ContractViolation::MissingResponse, location),
        }
    }

    /// Query response built from the in-memory record.
    #[must_use]
    pub fn recorded_timing_violations(&self) -> ViolationResponse {
        self.record.lock().response()
    }

    /// Copy of the notification slot of `task`.
    #[must_use]
    pub fn notification(&self, task: TaskId) -> Notification {
        self.registry.get(task)
    }

    /// Inferred execution state of `task`.
    #[must_use]
    pub fn task_phase(&self, task: TaskId) -> TaskPhase {
        self.registry.get(task).phase()
    }

    /// Copy of the in-memory violation record.
    #[must_use]
    pub fn violation_record(&self) -> ViolationRecord {
        *self.record.lock()
    }

    /// True if the record changed since it was last persisted successfully.
    #[must_use]
    pub fn has_unsaved_violations(&self) -> bool {
        self.unsaved.load(Ordering::Acquire)
    }

    /// Configured channels.
    #[must_use]
    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    /// Scheduler interface.
    #[must_use]
    pub fn os(&self) -> &O {
        &self.os
    }

    /// Diagnostic handler.
    #[must_use]
    pub fn diag(&self) -> &D {
        &self.diag
    }

    /// Contract-violation handler.
    #[must_use]
    pub fn fatal_handler(&self) -> &F {
        &self.fatal
    }

    fn fail_fatally(&self, violation: ContractViolation, location: &'static Location<'static>) {
        tracing::error!(violation = %violation, location = %location, "Contract violation");
        self.fatal.contract_violated(violation, location);
    }
}

impl<O, D, F> core::fmt::Debug for SystemMonitor<O, D, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SystemMonitor")
            .field("channels", &self.channels)
            .field("registry", &self.registry)
            .field("record", &*self.record.lock())
            .field("unsaved", &self.unsaved.load(Ordering::Acquire))
            .field("last_check", &self.last_check.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
