//! Mock collaborators for the supervisor.
//!
//! Every mock is `Send + Sync` so it can be shared with the monitor through
//! an `Arc` and inspected from the test afterwards.

use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use parking_lot::Mutex;

use bms_diag::{DiagHandler, DiagHandlerReturn, DiagId, DiagReport};
use bms_sysmon::{
    ContractViolation, FatalHandler, FramBlockId, FramError, FramResult, FramStore, OsInterface,
    TaskId, ViolationRecord,
};

/// Scheduler with a manually driven tick and an instrumented critical
/// section.
#[derive(Debug, Default)]
pub struct MockOs {
    tick: AtomicU32,
    critical_entries: AtomicUsize,
    depth: AtomicUsize,
    max_depth: AtomicUsize,
}

impl MockOs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `tick`.
    pub fn at(tick: u32) -> Self {
        let os = Self::new();
        os.set_tick(tick);
        os
    }

    pub fn set_tick(&self, tick: u32) {
        self.tick.store(tick, Ordering::SeqCst);
    }

    /// Advance the tick, wrapping at 2^32.
    pub fn advance(&self, ticks: u32) -> u32 {
        self.tick
            .fetch_add(ticks, Ordering::SeqCst)
            .wrapping_add(ticks)
    }

    /// Number of critical sections entered so far.
    pub fn critical_sections(&self) -> usize {
        self.critical_entries.load(Ordering::SeqCst)
    }

    /// True while a critical section is open.
    pub fn in_critical_section(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }

    /// Deepest nesting observed.
    pub fn max_critical_depth(&self) -> usize {
        self.max_depth.load(Ordering::SeqCst)
    }
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl OsInterface for MockOs {
    fn tick_count(&self) -> u32 {
        self.tick.load(Ordering::SeqCst)
    }

    fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R {
        self.critical_entries.fetch_add(1, Ordering::SeqCst);
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_depth.fetch_max(depth, Ordering::SeqCst);
        let _guard = DepthGuard(&self.depth);
        f()
    }
}

/// Diagnostic handler that records every report.
#[derive(Debug, Default)]
pub struct MockDiag {
    reports: Mutex<Vec<DiagReport>>,
    status: Mutex<DiagHandlerReturn>,
}

impl MockDiag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every report with `status`.
    pub fn returning(status: DiagHandlerReturn) -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            status: Mutex::new(status),
        }
    }

    pub fn reports(&self) -> Vec<DiagReport> {
        self.reports.lock().clone()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }

    /// Number of system-monitoring reports naming `task`.
    pub fn escalations_for(&self, task: TaskId) -> usize {
        self.reports
            .lock()
            .iter()
            .filter(|report| {
                report.id == DiagId::SystemMonitoring
                    && report.event.is_fault()
                    && report.data == u32::from(task.to_raw())
            })
            .count()
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl DiagHandler for MockDiag {
    fn handle(&self, report: DiagReport) -> DiagHandlerReturn {
        self.reports.lock().push(report);
        *self.status.lock()
    }
}

/// In-memory storage engine with injectable failures.
#[derive(Debug, Default)]
pub struct MockFram {
    stored: Option<ViolationRecord>,
    fail_writes: bool,
    fail_reads: bool,
    writes: usize,
}

impl MockFram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `record`.
    pub fn with_record(record: ViolationRecord) -> Self {
        Self {
            stored: Some(record),
            ..Self::default()
        }
    }

    /// Storage whose writes always fail.
    pub fn with_write_failure() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn stored(&self) -> Option<ViolationRecord> {
        self.stored
    }

    /// Write attempts, including failed ones.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl FramStore for MockFram {
    fn write(&mut self, block: FramBlockId, record: &ViolationRecord) -> FramResult<()> {
        self.writes += 1;
        if self.fail_writes {
            return Err(FramError::write_failed(block, "mock write failure"));
        }
        self.stored = Some(*record);
        Ok(())
    }

    fn read(&mut self, block: FramBlockId) -> FramResult<ViolationRecord> {
        if self.fail_reads {
            return Err(FramError::read_failed(block, "mock read failure"));
        }
        self.stored.ok_or(FramError::BlockEmpty(block))
    }
}

/// Fatal hook that records violations and returns, so the test keeps running.
#[derive(Debug, Default)]
pub struct RecordingFatalHandler {
    violations: Mutex<Vec<(ContractViolation, &'static Location<'static>)>>,
    fired: AtomicBool,
}

impl RecordingFatalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violations(&self) -> Vec<ContractViolation> {
        self.violations
            .lock()
            .iter()
            .map(|(violation, _)| *violation)
            .collect()
    }

    /// Source location of the most recent violation.
    pub fn last_location(&self) -> Option<&'static Location<'static>> {
        self.violations.lock().last().map(|(_, location)| *location)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.violations.lock().clear();
        self.fired.store(false, Ordering::SeqCst);
    }
}

impl FatalHandler for RecordingFatalHandler {
    fn contract_violated(&self, violation: ContractViolation, location: &'static Location<'static>) {
        self.violations.lock().push((violation, location));
        self.fired.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_os_tick_wraps() {
        let os = MockOs::at(u32::MAX);
        assert_eq!(os.advance(2), 1);
        assert_eq!(os.tick_count(), 1);
    }

    #[test]
    fn test_mock_os_tracks_nesting() {
        let os = MockOs::new();
        let inner = os.with_task_critical(|| os.with_task_critical(|| os.in_critical_section()));
        assert!(inner);
        assert!(!os.in_critical_section());
        assert_eq!(os.critical_sections(), 2);
        assert_eq!(os.max_critical_depth(), 2);
    }

    #[test]
    fn test_mock_fram_write_failure() {
        let mut fram = MockFram::with_write_failure();
        let result = fram.write(FramBlockId::SysMonRecord, &ViolationRecord::new());
        assert!(matches!(result, Err(FramError::WriteFailed { .. })));
        assert_eq!(fram.write_count(), 1);
        assert!(fram.stored().is_none());
    }

    #[test]
    fn test_mock_diag_counts_per_task() {
        let diag = MockDiag::returning(DiagHandlerReturn::ErrorOccurred);
        let status = diag.handle(DiagReport::not_ok(
            DiagId::SystemMonitoring,
            bms_diag::DiagImpact::System,
            2,
        ));
        assert_eq!(status, DiagHandlerReturn::ErrorOccurred);
        assert_eq!(diag.escalations_for(TaskId::Cyclic10ms), 1);
        assert_eq!(diag.escalations_for(TaskId::Engine), 0);
    }
}
