//! Identifiers of the monitored real-time tasks and their notification events.

use serde::{Deserialize, Serialize};

/// Number of monitored tasks and size of the notification registry.
pub const MAX_TASKS: usize = 5;

/// A monitored real-time task.
///
/// Each task owns one notification slot and maps to one violation category
/// of the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaskId {
    /// Engine task (database and state machines).
    Engine = 0,
    /// 1 ms cyclic task.
    Cyclic1ms = 1,
    /// 10 ms cyclic task.
    Cyclic10ms = 2,
    /// 100 ms cyclic task.
    Cyclic100ms = 3,
    /// 100 ms cyclic algorithm task.
    CyclicAlgorithm100ms = 4,
}

impl TaskId {
    /// All tasks in registry order.
    pub const ALL: [TaskId; MAX_TASKS] = [
        TaskId::Engine,
        TaskId::Cyclic1ms,
        TaskId::Cyclic10ms,
        TaskId::Cyclic100ms,
        TaskId::CyclicAlgorithm100ms,
    ];

    /// Convert from a raw task number.
    ///
    /// Returns `None` for numbers at or above [`MAX_TASKS`].
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Engine),
            1 => Some(Self::Cyclic1ms),
            2 => Some(Self::Cyclic10ms),
            3 => Some(Self::Cyclic100ms),
            4 => Some(Self::CyclicAlgorithm100ms),
            _ => None,
        }
    }

    /// Raw task number.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Position in the notification registry.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.to_raw())
    }

    /// Short name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Cyclic1ms => "1ms",
            Self::Cyclic10ms => "10ms",
            Self::Cyclic100ms => "100ms",
            Self::CyclicAlgorithm100ms => "100ms-algorithm",
        }
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event reported by task instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NotifyEvent {
    /// The task body started.
    Enter = 0,
    /// The task body finished.
    Exit = 1,
}

impl NotifyEvent {
    /// Convert from a raw event code.
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Enter),
            1 => Some(Self::Exit),
            _ => None,
        }
    }

    /// Raw event code.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }
}
