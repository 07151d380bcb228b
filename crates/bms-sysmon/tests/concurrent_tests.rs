//! Concurrency tests: instrumentation from several task threads while the
//! checker and the persistence path run.

use bms_sysmon::prelude::*;
use bms_test_helpers::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

type SharedMonitor = Arc<SystemMonitor<Arc<MockOs>, MockDiag, RecordingFatalHandler>>;

fn shared_monitor(os: &Arc<MockOs>) -> SharedMonitor {
    Arc::new(SystemMonitor::with_fatal_handler(
        ChannelTable::controller_default(),
        Arc::clone(os),
        MockDiag::new(),
        RecordingFatalHandler::new(),
    ))
}

#[test]
fn test_concurrent_notify_keeps_slots_independent() {
    let os = Arc::new(MockOs::new());
    let monitor = shared_monitor(&os);
    let mut handles = vec![];

    for task in TaskId::ALL {
        let monitor_clone = Arc::clone(&monitor);
        let handle = thread::spawn(move || {
            let offset = u32::from(task.to_raw()) + 1;
            for cycle in 0..1000u32 {
                let start = cycle * 10 + offset;
                monitor_clone.notify(task, NotifyEvent::Enter, start);
                monitor_clone.notify(task, NotifyEvent::Exit, start + offset);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    for task in TaskId::ALL {
        let offset = u32::from(task.to_raw()) + 1;
        let notification = monitor.notification(task);
        assert_eq!(notification.timestamp_enter, 999 * 10 + offset);
        assert_eq!(notification.duration, offset);
        assert_eq!(monitor.task_phase(task), TaskPhase::Completed);
    }
    assert_eq!(os.critical_sections(), TaskId::ALL.len() * 2000);
    assert!(!os.in_critical_section());
    assert_no_fatal!(monitor.fatal_handler());
}

#[test]
fn test_checker_runs_alongside_instrumentation() {
    let os = Arc::new(MockOs::at(10_000));
    let monitor = shared_monitor(&os);
    let mut handles = vec![];

    for task in TaskId::ALL {
        let monitor_clone = Arc::clone(&monitor);
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                monitor_clone.notify(task, NotifyEvent::Enter, 9_999);
                monitor_clone.notify(task, NotifyEvent::Exit, 10_000);
            }
        }));
    }

    let checker = Arc::clone(&monitor);
    handles.push(thread::spawn(move || {
        for _ in 0..500 {
            assert!(checker.check_notifications().is_clean());
        }
    }));

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }
    assert_eq!(monitor.diag().report_count(), 0);
}

#[test]
fn test_persistence_alongside_checker() -> TestResult {
    let os = Arc::new(MockOs::at(1_000));
    let monitor = shared_monitor(&os);
    let fram = Arc::new(Mutex::new(MockFram::new()));

    for task in TaskId::ALL {
        monitor.notify(task, NotifyEvent::Enter, 1);
    }

    let checker_monitor = Arc::clone(&monitor);
    let checker_os = Arc::clone(&os);
    let checker = thread::spawn(move || {
        for _ in 0..200 {
            checker_os.advance(1);
            checker_monitor.check_notifications();
        }
    });

    let writer_monitor = Arc::clone(&monitor);
    let writer_fram = Arc::clone(&fram);
    let writer = thread::spawn(move || {
        for _ in 0..200 {
            if writer_monitor.has_unsaved_violations() {
                writer_monitor
                    .update_fram_data(&mut *writer_fram.lock())
                    .map_err(|err| err.to_string())?;
            }
        }
        Ok::<(), String>(())
    });

    assert!(checker.join().is_ok(), "Checker should not panic");
    writer
        .join()
        .map_err(|panic| format!("writer panicked: {panic:?}"))??;

    monitor.update_fram_data(&mut *fram.lock())?;
    assert!(!monitor.has_unsaved_violations());
    assert_eq!(fram.lock().stored(), Some(monitor.violation_record()));

    let response = monitor.recorded_timing_violations();
    for task in TaskId::ALL {
        assert!(response.for_task(task));
        assert_escalations!(monitor.diag(), task, 200);
    }
    Ok(())
}
