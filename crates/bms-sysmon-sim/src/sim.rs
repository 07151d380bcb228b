//! Runs one thread per enabled channel against a shared monitor while the
//! main thread plays the role of the periodic checker.

use bms_sysmon::{
    ChannelTable, FramError, NotifyEvent, OsInterface, SystemMonitor, TaskId, ViolationRecord,
    ViolationResponse,
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::diag::LoggingDiag;
use crate::error::SimError;
use crate::fram::JsonFileFram;
use crate::os::SimulatedOs;

type SimMonitor = SystemMonitor<Arc<SimulatedOs>, Arc<LoggingDiag>>;

/// Stall injected into one task: a single activation that stays running.
#[derive(Debug, Clone, Copy)]
pub struct Stall {
    pub task: TaskId,
    pub after: Duration,
    pub length: Duration,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub duration: Duration,
    pub start_tick: u32,
    pub check_period: Duration,
    pub persist_every: Duration,
    pub stall: Option<Stall>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskEscalations {
    pub task: TaskId,
    pub escalations: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub start_tick: u32,
    pub end_tick: u32,
    pub checks: u64,
    pub escalations: Vec<TaskEscalations>,
    pub violations: ViolationResponse,
    pub record: ViolationRecord,
    pub persisted: bool,
}

/// Run the simulation.
///
/// With a FRAM image the persisted record is restored first, written
/// whenever it changed (at most every `persist_every`) and once more at the
/// end.
pub fn run(
    table: ChannelTable,
    config: &SimConfig,
    mut fram: Option<&mut JsonFileFram>,
) -> Result<SimReport, SimError> {
    let os = Arc::new(SimulatedOs::new(config.start_tick));
    let diag = Arc::new(LoggingDiag::new());
    let monitor: SimMonitor = SystemMonitor::new(table, Arc::clone(&os), Arc::clone(&diag));

    if let Some(fram) = fram.as_deref_mut() {
        match monitor.restore_from_fram(fram) {
            Ok(()) => tracing::info!(path = %fram.path().display(), "Restored violation record"),
            Err(FramError::BlockEmpty(_)) => {
                tracing::debug!(path = %fram.path().display(), "No persisted violation record");
            }
            Err(err) => return Err(err.into()),
        }
    }

    let tasks: Vec<(TaskId, u32)> = monitor
        .channels()
        .iter()
        .filter(|channel| channel.enabled)
        .map(|channel| (channel.task, channel.cycle_time))
        .collect();
    tracing::info!(
        tasks = tasks.len(),
        start_tick = config.start_tick,
        duration_ms = config.duration.as_millis(),
        "Starting simulation"
    );

    let stop = AtomicBool::new(false);
    let started = Instant::now();
    let mut checks = 0u64;

    thread::scope(|scope| -> Result<(), SimError> {
        let monitor = &monitor;
        let stop = &stop;
        let handles: Vec<_> = tasks
            .iter()
            .map(|&(task, cycle_time)| {
                let stall = config.stall.filter(|stall| stall.task == task);
                scope.spawn(move || run_task(monitor, task, cycle_time, stall, stop, started))
            })
            .collect();

        let mut last_persist = started;
        let checker_result = loop {
            if started.elapsed() >= config.duration {
                break Ok(());
            }

            monitor.check_notifications();
            checks = checks.saturating_add(1);

            if let Some(fram) = fram.as_deref_mut() {
                if monitor.has_unsaved_violations() && last_persist.elapsed() >= config.persist_every {
                    last_persist = Instant::now();
                    if let Err(err) = monitor.update_fram_data(fram) {
                        break Err(SimError::from(err));
                    }
                }
            }

            thread::sleep(config.check_period);
        };

        stop.store(true, Ordering::Release);
        for handle in handles {
            handle
                .join()
                .map_err(|_panic| SimError::ThreadPanicked("task"))?;
        }
        checker_result
    })?;

    let persisted = match fram {
        Some(fram) => {
            monitor.update_fram_data(fram)?;
            true
        }
        None => false,
    };

    Ok(SimReport {
        start_tick: config.start_tick,
        end_tick: monitor.os().tick_count(),
        checks,
        escalations: TaskId::ALL
            .into_iter()
            .map(|task| TaskEscalations {
                task,
                escalations: diag.escalations(task),
            })
            .collect(),
        violations: monitor.recorded_timing_violations(),
        record: monitor.violation_record(),
        persisted,
    })
}

fn run_task(
    monitor: &SimMonitor,
    task: TaskId,
    cycle_time: u32,
    stall: Option<Stall>,
    stop: &AtomicBool,
    started: Instant,
) {
    let period = Duration::from_millis(u64::from(cycle_time.max(1)));
    let work = period / 5;
    let mut stall = stall;
    let mut next = Instant::now();

    while !stop.load(Ordering::Acquire) {
        monitor.notify(task, NotifyEvent::Enter, monitor.os().tick_count());
        thread::sleep(work);

        if let Some(pending) = stall.filter(|pending| started.elapsed() >= pending.after) {
            tracing::info!(
                task = %task,
                length_ms = pending.length.as_millis(),
                "Stalling task"
            );
            thread::sleep(pending.length);
            stall = None;
        }

        monitor.notify(task, NotifyEvent::Exit, monitor.os().tick_count());

        next += period;
        let now = Instant::now();
        match next.checked_duration_since(now) {
            Some(remaining) => thread::sleep(remaining),
            None => next = now,
        }
    }
}
