//! Assertion macros for supervisor tests.

/// Assert that the recording fatal handler has seen exactly the given
/// contract violations, in order.
///
/// # Example
///
/// ```rust
/// use bms_sysmon::{ContractViolation, FatalHandler};
/// use bms_test_helpers::assert_fatal;
/// use bms_test_helpers::mock::RecordingFatalHandler;
///
/// let fatal = RecordingFatalHandler::new();
/// fatal.contract_violated(
///     ContractViolation::MissingResponse,
///     std::panic::Location::caller(),
/// );
/// assert_fatal!(fatal, ContractViolation::MissingResponse);
/// ```
#[macro_export]
macro_rules! assert_fatal {
    ($handler:expr, $($violation:expr),+ $(,)?) => {
        let expected = [$($violation),+];
        let actual = $handler.violations();
        if actual.as_slice() != expected.as_slice() {
            panic!(
                "assertion failed: unexpected contract violations\n  expected: `{:?}`,\n    actual: `{:?}`",
                expected, actual
            );
        }
    };
}

/// Assert that the recording fatal handler has not fired.
#[macro_export]
macro_rules! assert_no_fatal {
    ($handler:expr $(,)?) => {
        let actual = $handler.violations();
        if !actual.is_empty() {
            panic!(
                "assertion failed: no contract violation expected\n  actual: `{:?}`",
                actual
            );
        }
    };
}

/// Assert how many times a task was escalated to the diagnostic mock.
///
/// # Example
///
/// ```rust
/// use bms_sysmon::TaskId;
/// use bms_test_helpers::assert_escalations;
/// use bms_test_helpers::mock::MockDiag;
///
/// let diag = MockDiag::new();
/// assert_escalations!(diag, TaskId::Engine, 0);
/// ```
#[macro_export]
macro_rules! assert_escalations {
    ($diag:expr, $task:expr, $count:expr $(,)?) => {
        let task = $task;
        let expected: usize = $count;
        let actual = $diag.escalations_for(task);
        if actual != expected {
            panic!(
                "assertion failed: task {} escalated {} times, expected {}\n  reports: `{:?}`",
                task,
                actual,
                expected,
                $diag.reports()
            );
        }
    };
}
