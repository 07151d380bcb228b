//! The persisted violation record and the query response derived from it.
//!
//! The record survives resets through the FRAM block
//! [`crate::FramBlockId::SysMonRecord`]. It holds an aggregate flag and, per
//! task category, the enter tick and the elapsed ticks of the most recent
//! recorded violation. A category pair stays all-zero until a violation of
//! that task is recorded.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// Timing data of the most recent recorded violation of one task category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct TaskTimingRecord {
    /// Enter tick of the violating activation.
    pub enter_timestamp: u32,
    /// Ticks elapsed since that enter when the violation was detected.
    pub violating_duration: u32,
}

impl TaskTimingRecord {
    /// True if either field is nonzero.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.enter_timestamp != 0 || self.violating_duration != 0
    }
}

/// Aggregate and per-category violation state, persisted across resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Set by every recorded violation, cleared only explicitly.
    pub any_timing_issue_occurred: bool,
    /// Engine task category.
    pub task_engine: TaskTimingRecord,
    /// 1 ms task category.
    pub task_1ms: TaskTimingRecord,
    /// 10 ms task category.
    pub task_10ms: TaskTimingRecord,
    /// 100 ms task category.
    pub task_100ms: TaskTimingRecord,
    /// 100 ms algorithm task category.
    pub task_100ms_algorithm: TaskTimingRecord,
}

impl ViolationRecord {
    /// Number of scalar fields in the persisted schema.
    pub const FIELD_COUNT: usize = 11;

    /// Create an all-zero record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Category belonging to `task`.
    #[must_use]
    pub fn category(&self, task: TaskId) -> &TaskTimingRecord {
        match task {
            TaskId::Engine => &self.task_engine,
            TaskId::Cyclic1ms => &self.task_1ms,
            TaskId::Cyclic10ms => &self.task_10ms,
            TaskId::Cyclic100ms => &self.task_100ms,
            TaskId::CyclicAlgorithm100ms => &self.task_100ms_algorithm,
        }
    }

    /// Mutable category belonging to `task`.
    pub fn category_mut(&mut self, task: TaskId) -> &mut TaskTimingRecord {
        match task {
            TaskId::Engine => &mut self.task_engine,
            TaskId::Cyclic1ms => &mut self.task_1ms,
            TaskId::Cyclic10ms => &mut self.task_10ms,
            TaskId::Cyclic100ms => &mut self.task_100ms,
            TaskId::CyclicAlgorithm100ms => &mut self.task_100ms_algorithm,
        }
    }

    /// Store a violation of `task` and raise the aggregate flag.
    pub fn record_violation(&mut self, task: TaskId, enter_timestamp: u32, violating_duration: u32) {
        self.any_timing_issue_occurred = true;
        let category = self.category_mut(task);
        category.enter_timestamp = enter_timestamp;
        category.violating_duration = violating_duration;
    }

    /// Field-wise copy of every field of `source` into `self`.
    pub fn copy_from(&mut self, source: &Self) {
        self.any_timing_issue_occurred = source.any_timing_issue_occurred;
        self.task_engine.enter_timestamp = source.task_engine.enter_timestamp;
        self.task_engine.violating_duration = source.task_engine.violating_duration;
        self.task_1ms.enter_timestamp = source.task_1ms.enter_timestamp;
        self.task_1ms.violating_duration = source.task_1ms.violating_duration;
        self.task_10ms.enter_timestamp = source.task_10ms.enter_timestamp;
        self.task_10ms.violating_duration = source.task_10ms.violating_duration;
        self.task_100ms.enter_timestamp = source.task_100ms.enter_timestamp;
        self.task_100ms.violating_duration = source.task_100ms.violating_duration;
        self.task_100ms_algorithm.enter_timestamp = source.task_100ms_algorithm.enter_timestamp;
        self.task_100ms_algorithm.violating_duration =
            source.task_100ms_algorithm.violating_duration;
    }

    /// Reset every field to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }

    /// Derive the query response.
    ///
    /// A category flag is set when either of its fields is nonzero. The
    /// aggregate is set when the aggregate flag or any category flag is set,
    /// so it can be true without any category being attributable.
    #[must_use]
    pub fn response(&self) -> ViolationResponse {
        let engine = self.task_engine.is_recorded();
        let cyclic_1ms = self.task_1ms.is_recorded();
        let cyclic_10ms = self.task_10ms.is_recorded();
        let cyclic_100ms = self.task_100ms.is_recorded();
        let cyclic_100ms_algorithm = self.task_100ms_algorithm.is_recorded();

        ViolationResponse {
            recorded_violation_any: self.any_timing_issue_occurred
                || engine
                || cyclic_1ms
                || cyclic_10ms
                || cyclic_100ms
                || cyclic_100ms_algorithm,
            recorded_violation_engine: engine,
            recorded_violation_1ms: cyclic_1ms,
            recorded_violation_10ms: cyclic_10ms,
            recorded_violation_100ms: cyclic_100ms,
            recorded_violation_100ms_algorithm: cyclic_100ms_algorithm,
        }
    }
}

/// Boolean summary of the violation record for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct ViolationResponse {
    /// Any violation has been recorded.
    pub recorded_violation_any: bool,
    /// Engine task violation recorded.
    pub recorded_violation_engine: bool,
    /// 1 ms task violation recorded.
    pub recorded_violation_1ms: bool,
    /// 10 ms task violation recorded.
    pub recorded_violation_10ms: bool,
    /// 100 ms task violation recorded.
    pub recorded_violation_100ms: bool,
    /// 100 ms algorithm task violation recorded.
    pub recorded_violation_100ms_algorithm: bool,
}

impl ViolationResponse {
    /// Category flag of `task`.
    #[must_use]
    pub fn for_task(&self, task: TaskId) -> bool {
        match task {
            TaskId::Engine => self.recorded_violation_engine,
            TaskId::Cyclic1ms => self.recorded_violation_1ms,
            TaskId::Cyclic10ms => self.recorded_violation_10ms,
            TaskId::Cyclic100ms => self.recorded_violation_100ms,
            TaskId::CyclicAlgorithm100ms => self.recorded_violation_100ms_algorithm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_record_yields_no_flags() {
        let response = ViolationRecord::new().response();
        assert_eq!(response, ViolationResponse::default());
    }

    #[test]
    fn test_flags_follow_nonzero_fields() {
        let mut record = ViolationRecord::new();
        record.any_timing_issue_occurred = true;
        record.task_engine.enter_timestamp = 100;
        record.task_1ms.violating_duration = 5;

        let response = record.response();
        assert!(response.recorded_violation_any);
        assert!(response.recorded_violation_engine);
        assert!(response.recorded_violation_1ms);
        assert!(!response.recorded_violation_10ms);
        assert!(!response.recorded_violation_100ms);
        assert!(!response.recorded_violation_100ms_algorithm);
    }

    #[test]
    fn test_aggregate_without_category() {
        let record = ViolationRecord {
            any_timing_issue_occurred: true,
            ..ViolationRecord::default()
        };
        let response = record.response();
        assert!(response.recorded_violation_any);
        for task in TaskId::ALL {
            assert!(!response.for_task(task));
        }
    }

    #[test]
    fn test_category_without_aggregate_still_sets_any() {
        let mut record = ViolationRecord::new();
        record.task_100ms.violating_duration = 1;
        assert!(record.response().recorded_violation_any);
    }

    #[test]
    fn test_record_violation_touches_one_category() {
        let mut record = ViolationRecord::new();
        record.record_violation(TaskId::Cyclic10ms, 40, 13);

        assert!(record.any_timing_issue_occurred);
        for task in TaskId::ALL {
            let category = record.category(task);
            if task == TaskId::Cyclic10ms {
                assert_eq!(category.enter_timestamp, 40);
                assert_eq!(category.violating_duration, 13);
            } else {
                assert!(!category.is_recorded());
            }
        }
    }

    #[test]
    fn test_copy_from_copies_every_field() {
        let source = ViolationRecord {
            any_timing_issue_occurred: true,
            task_100ms_algorithm: TaskTimingRecord {
                enter_timestamp: 1,
                violating_duration: 2,
            },
            task_100ms: TaskTimingRecord {
                enter_timestamp: 3,
                violating_duration: 4,
            },
            task_10ms: TaskTimingRecord {
                enter_timestamp: 5,
                violating_duration: 6,
            },
            task_1ms: TaskTimingRecord {
                enter_timestamp: 7,
                violating_duration: 8,
            },
            task_engine: TaskTimingRecord {
                enter_timestamp: 9,
                violating_duration: 10,
            },
        };
        let mut destination = ViolationRecord::new();
        assert_ne!(source, destination);

        destination.copy_from(&source);
        assert_eq!(source, destination);
    }

    #[test]
    fn test_clear() {
        let mut record = ViolationRecord::new();
        record.record_violation(TaskId::Engine, 1, 2);
        assert!(!record.is_clear());
        record.clear();
        assert!(record.is_clear());
    }
}
