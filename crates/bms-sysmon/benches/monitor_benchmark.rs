//! Performance benchmarks for the instrumentation and check paths.

use bms_sysmon::prelude::*;
use bms_sysmon::{DiagHandler, DiagHandlerReturn, DiagReport};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::atomic::{AtomicU32, Ordering};

struct BenchOs(AtomicU32);

impl OsInterface for BenchOs {
    fn tick_count(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    fn with_task_critical<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

struct NullDiag;

impl DiagHandler for NullDiag {
    fn handle(&self, _report: DiagReport) -> DiagHandlerReturn {
        DiagHandlerReturn::Ok
    }
}

fn monitor_at(tick: u32) -> SystemMonitor<BenchOs, NullDiag> {
    SystemMonitor::new(
        ChannelTable::controller_default(),
        BenchOs(AtomicU32::new(tick)),
        NullDiag,
    )
}

fn bench_notify(c: &mut Criterion) {
    let monitor = monitor_at(0);

    c.bench_function("notify_enter_exit", |b| {
        b.iter(|| {
            monitor.notify(black_box(TaskId::Cyclic1ms), NotifyEvent::Enter, black_box(10));
            monitor.notify(black_box(TaskId::Cyclic1ms), NotifyEvent::Exit, black_box(11));
        });
    });

    c.bench_function("notify_raw_enter", |b| {
        b.iter(|| monitor.notify_raw(black_box(2), black_box(0), black_box(40)));
    });
}

fn bench_check_notifications(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_notifications");

    for late_tasks in [0usize, 1, 5] {
        let monitor = monitor_at(1_000);
        for (position, task) in TaskId::ALL.into_iter().enumerate() {
            let enter = if position < late_tasks { 1 } else { 999 };
            monitor.notify(task, NotifyEvent::Enter, enter);
        }

        group.bench_with_input(BenchmarkId::new("late_tasks", late_tasks), &monitor, |b, m| {
            b.iter(|| {
                // Alternate the tick so no pass hits the unchanged-tick exit.
                let tick = m.os().0.load(Ordering::Relaxed);
                m.os().0.store(tick ^ 1, Ordering::Relaxed);
                black_box(m.check_notifications())
            });
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let monitor = monitor_at(1_000);
    monitor.notify(TaskId::Engine, NotifyEvent::Enter, 1);
    monitor.check_notifications();

    c.bench_function("recorded_timing_violations", |b| {
        b.iter(|| black_box(monitor.recorded_timing_violations()));
    });
}

criterion_group!(benches, bench_notify, bench_check_notifications, bench_query);
criterion_main!(benches);
