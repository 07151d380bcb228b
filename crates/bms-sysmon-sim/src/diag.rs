//! Diagnostic handler that logs escalations and counts them per task.

use bms_diag::{DiagHandler, DiagHandlerReturn, DiagReport};
use bms_sysmon::{MAX_TASKS, TaskId};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct LoggingDiag {
    per_task: Mutex<[u32; MAX_TASKS]>,
}

impl LoggingDiag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escalations received for `task`.
    pub fn escalations(&self, task: TaskId) -> u32 {
        self.per_task
            .lock()
            .get(task.index())
            .copied()
            .unwrap_or_default()
    }
}

impl DiagHandler for LoggingDiag {
    fn handle(&self, report: DiagReport) -> DiagHandlerReturn {
        let task = u8::try_from(report.data).ok().and_then(TaskId::from_raw);
        let Some(task) = task.filter(|_| report.event.is_fault()) else {
            tracing::debug!(%report, "Ignoring diagnostic report");
            return DiagHandlerReturn::UnknownEvent;
        };

        if let Some(count) = self.per_task.lock().get_mut(task.index()) {
            *count = count.saturating_add(1);
        }
        tracing::error!(task = %task, %report, "Diagnostic event raised");
        DiagHandlerReturn::Ok
    }
}
