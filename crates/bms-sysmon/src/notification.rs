//! The notification registry written by task instrumentation.
//!
//! Every monitored task owns one slot holding the tick of its most recent
//! enter, the tick of its most recent exit and the duration between them.
//! Slots are written only by instrumentation (inside a task-level critical
//! section) and read lock-free by the deadline checker.

use portable_atomic::{AtomicU32, Ordering};
use serde::{Deserialize, Serialize};

use crate::task::{MAX_TASKS, NotifyEvent, TaskId};

/// Ticks elapsed from `from` to `to` on a counter that wraps at 2^32.
///
/// ```rust
/// use bms_sysmon::tick_delta;
///
/// assert_eq!(tick_delta(10, 25), 15);
/// assert_eq!(tick_delta(u32::MAX, 100), 101);
/// ```
#[must_use]
#[inline]
pub fn tick_delta(from: u32, to: u32) -> u32 {
    to.wrapping_sub(from)
}

/// Execution state of a task as inferred from its notification slot.
///
/// This is a derived view. The authoritative rule for the start-up exemption
/// is [`Notification::is_idle`]: both timestamps zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    /// No enter or exit has been recorded since boot.
    Idle,
    /// An enter has been recorded and its exit is pending.
    Running,
    /// The last recorded event was an exit; `duration` is current.
    Completed,
}

/// Snapshot of one notification slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Tick of the most recent enter.
    pub timestamp_enter: u32,
    /// Tick of the most recent exit.
    pub timestamp_exit: u32,
    /// Ticks between the most recent enter and exit.
    pub duration: u32,
}

impl Notification {
    /// True if the task has never reported since boot.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timestamp_enter == 0 && self.timestamp_exit == 0
    }

    /// Ticks elapsed between the most recent enter and `now`.
    #[must_use]
    pub fn elapsed_since_enter(&self, now: u32) -> u32 {
        tick_delta(self.timestamp_enter, now)
    }

    /// Inferred execution state.
    ///
    /// An exit stores `duration = exit - enter`; a later enter moves
    /// `timestamp_enter` so that relation no longer holds until the next exit.
    ///
    /// The slot does not record which event came last, so an enter at the
    /// same tick as the previous enter is reported as
    /// [`TaskPhase::Completed`] although the task is running again. Only
    /// [`Notification::is_idle`] drives checking; the phase is informational.
    #[must_use]
    pub fn phase(&self) -> TaskPhase {
        if self.is_idle() {
            TaskPhase::Idle
        } else if tick_delta(self.timestamp_enter, self.timestamp_exit) == self.duration {
            TaskPhase::Completed
        } else {
            TaskPhase::Running
        }
    }
}

/// One registry slot.
#[derive(Debug, Default)]
struct NotificationSlot {
    enter: AtomicU32,
    exit: AtomicU32,
    duration: AtomicU32,
}

impl NotificationSlot {
    fn snapshot(&self) -> Notification {
        Notification {
            timestamp_enter: self.enter.load(Ordering::Acquire),
            timestamp_exit: self.exit.load(Ordering::Acquire),
            duration: self.duration.load(Ordering::Acquire),
        }
    }

    fn record(&self, event: NotifyEvent, timestamp: u32) {
        match event {
            NotifyEvent::Enter => self.enter.store(timestamp, Ordering::Release),
            NotifyEvent::Exit => {
                let enter = self.enter.load(Ordering::Acquire);
                self.duration
                    .store(tick_delta(enter, timestamp), Ordering::Release);
                self.exit.store(timestamp, Ordering::Release);
            }
        }
    }

    fn reset(&self) {
        self.enter.store(0, Ordering::Release);
        self.exit.store(0, Ordering::Release);
        self.duration.store(0, Ordering::Release);
    }
}

/// Fixed-size registry with one slot per [`TaskId`].
///
/// # RT Safety
///
/// All methods are allocation-free and lock-free. Writers must be serialised
/// by the caller; [`crate::SystemMonitor`] does so with the OS critical section.
#[derive(Debug, Default)]
pub struct NotificationRegistry {
    slots: [NotificationSlot; MAX_TASKS],
}

impl NotificationRegistry {
    /// Create a registry with every slot zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "TaskId::index is always below MAX_TASKS"
    )]
    fn slot(&self, task: TaskId) -> &NotificationSlot {
        &self.slots[task.index()]
    }

    /// Copy of the slot belonging to `task`.
    #[must_use]
    pub fn get(&self, task: TaskId) -> Notification {
        self.slot(task).snapshot()
    }

    /// Store an enter or exit timestamp for `task`.
    pub fn record(&self, task: TaskId, event: NotifyEvent, timestamp: u32) {
        self.slot(task).record(event, timestamp);
    }

    /// Zero every slot.
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.reset();
        }
    }
}
