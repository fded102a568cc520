#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_core::{ActionError, FnAction};
use rewind_engine::{EngineConfig, UndoEngine};

#[derive(Debug, Arbitrary)]
enum Op {
    Execute {
        kind: u8,
        delta: i16,
        gap_ms: u16,
        fail_apply: bool,
        fail_revert: bool,
    },
    Undo,
    Redo,
    Begin,
    End,
    Cancel,
    Rollback,
    Compress,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    cap: u8,
    window_ms: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let cap = usize::from(input.cap % 16) + 1;
    let engine = UndoEngine::new(EngineConfig::new(cap, u64::from(input.window_ms)));
    let total = Rc::new(Cell::new(0i64));
    let mut ts = 0u64;

    for op in input.ops.into_iter().take(512) {
        match op {
            Op::Execute {
                kind,
                delta,
                gap_ms,
                fail_apply,
                fail_revert,
            } => {
                ts += u64::from(gap_ms);
                let delta = i64::from(delta);
                let (up, down) = (total.clone(), total.clone());
                let action = FnAction::new(
                    format!("k{}", kind % 4),
                    "step",
                    move || {
                        if fail_apply {
                            return Err(ActionError::other("apply"));
                        }
                        up.set(up.get() + delta);
                        Ok(())
                    },
                    move || {
                        if fail_revert {
                            return Err(ActionError::other("revert"));
                        }
                        down.set(down.get() - delta);
                        Ok(())
                    },
                )
                .at(ts);
                let before = engine.history_size();
                if engine.execute_action(action).is_err() {
                    assert_eq!(engine.history_size(), before, "failed execute recorded");
                }
            }
            Op::Undo => {
                let before = engine.history_size();
                if engine.undo() {
                    assert_eq!(engine.history_size().undo + 1, before.undo);
                    assert_eq!(engine.history_size().redo, before.redo + 1);
                } else {
                    assert_eq!(engine.history_size(), before, "failed undo moved entries");
                }
            }
            Op::Redo => {
                let before = engine.history_size();
                if engine.redo() {
                    assert_eq!(engine.history_size().redo + 1, before.redo);
                } else {
                    assert_eq!(engine.history_size(), before, "failed redo moved entries");
                }
            }
            Op::Begin => engine.begin_transaction(),
            Op::End => {
                engine.end_transaction("tx");
            }
            Op::Cancel => engine.cancel_transaction(),
            Op::Rollback => {
                let _ = engine.rollback_transaction();
            }
            Op::Compress => {
                engine.compress();
            }
            Op::Clear => {
                engine.clear();
                assert!(!engine.can_undo() && !engine.can_redo());
            }
        }

        let size = engine.history_size();
        assert!(size.undo <= cap, "undo stack above cap");
        assert_eq!(engine.can_undo(), size.undo > 0 && !engine.in_transaction());
        assert_eq!(engine.serialize().undo_descriptions.len(), size.undo);
    }
});
