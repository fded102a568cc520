//! Benchmarks for the hot paths of the undo engine.
//!
//! Run with: cargo bench -p rewind-engine --bench engine_bench
//!
//! - `execute/*`: recording with and without grouping, at and below the cap
//! - `replay/*`: undo-all followed by redo-all
//! - `compress/*`: single pass over a stack of alternating kinds

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use rewind_core::FnAction;
use rewind_engine::{EngineConfig, UndoEngine};

fn counter_action(counter: &Rc<Cell<u64>>, kind: &'static str, ts: u64) -> FnAction {
    let (up, down) = (counter.clone(), counter.clone());
    FnAction::new(
        kind,
        "step",
        move || {
            up.set(up.get() + 1);
            Ok(())
        },
        move || {
            down.set(down.get() - 1);
            Ok(())
        },
    )
    .at(ts)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    for &n in &[100u64, 1_000] {
        group.bench_with_input(BenchmarkId::new("ungrouped", n), &n, |b, &n| {
            b.iter(|| {
                let counter = Rc::new(Cell::new(0));
                let engine = UndoEngine::new(EngineConfig::unlimited().without_grouping());
                for i in 0..n {
                    engine.execute_action(counter_action(&counter, "edit", i)).ok();
                }
                black_box(engine.history_size())
            })
        });

        group.bench_with_input(BenchmarkId::new("grouped", n), &n, |b, &n| {
            b.iter(|| {
                let counter = Rc::new(Cell::new(0));
                let engine = UndoEngine::new(EngineConfig::new(usize::MAX, 500));
                for i in 0..n {
                    engine.execute_action(counter_action(&counter, "edit", i)).ok();
                }
                black_box(engine.history_size())
            })
        });

        group.bench_with_input(BenchmarkId::new("capped_100", n), &n, |b, &n| {
            b.iter(|| {
                let counter = Rc::new(Cell::new(0));
                let engine = UndoEngine::new(EngineConfig::new(100, 0));
                for i in 0..n {
                    engine.execute_action(counter_action(&counter, "edit", i)).ok();
                }
                black_box(engine.stats().evicted_total)
            })
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    group.bench_function("undo_redo_all_1000", |b| {
        let counter = Rc::new(Cell::new(0));
        let engine = UndoEngine::new(EngineConfig::unlimited().without_grouping());
        for i in 0..1_000 {
            engine.execute_action(counter_action(&counter, "edit", i)).ok();
        }
        b.iter(|| {
            while engine.undo() {}
            while engine.redo() {}
            black_box(counter.get())
        })
    });

    group.finish();
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    group.bench_function("alternating_kinds_1000", |b| {
        b.iter(|| {
            let counter = Rc::new(Cell::new(0));
            let engine = UndoEngine::new(EngineConfig::unlimited().without_grouping());
            for i in 0..1_000 {
                let kind = if (i / 4) % 2 == 0 { "edit" } else { "move" };
                engine.execute_action(counter_action(&counter, kind, i * 10)).ok();
            }
            black_box(engine.compress())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_execute, bench_replay, bench_compress);
criterion_main!(benches);
