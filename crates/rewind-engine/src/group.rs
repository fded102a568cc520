#![forbid(unsafe_code)]

//! The grouping rule shared by push-time grouping and `compress()`.
//!
//! Two entries group when they have the same kind, their timestamps are
//! less than the window apart, and neither is a sealed transaction. Targets
//! are not compared: two same-kind edits on different entities inside the
//! window group too.

use std::collections::VecDeque;

use rewind_core::{Action, CompositeAction};

fn is_sealed(action: &dyn Action) -> bool {
    action
        .as_composite()
        .is_some_and(CompositeAction::is_sealed)
}

/// Whether `next` may fold into `top`.
pub(crate) fn can_group(top: &dyn Action, next: &dyn Action, window_ms: u64) -> bool {
    if is_sealed(top) || is_sealed(next) {
        return false;
    }
    top.kind() == next.kind() && top.timestamp().abs_diff(next.timestamp()) < window_ms
}

/// Fold `next` into `top`, wrapping `top` in a composite first if needed.
pub(crate) fn fold(top: Box<dyn Action>, next: Box<dyn Action>) -> Box<dyn Action> {
    let mut group = match top.as_composite() {
        Some(_) => top,
        None => Box::new(CompositeAction::wrap(top)),
    };
    if let Some(composite) = group.as_composite_mut() {
        composite.absorb(next);
    }
    group
}

/// Coalesce adjacent groupable entries until no pair groups.
///
/// A folded entry keeps the kind of its first member but takes the
/// timestamp of its newest one, so with out-of-order timestamps a fold can
/// bring a group inside the window of its lower neighbour. Passes repeat
/// until one folds nothing.
pub(crate) fn compress(
    mut stack: VecDeque<Box<dyn Action>>,
    window_ms: u64,
) -> VecDeque<Box<dyn Action>> {
    loop {
        let before = stack.len();
        stack = compress_pass(stack, window_ms);
        if stack.len() == before {
            return stack;
        }
    }
}

/// One bottom-to-top pass folding each entry into its lower neighbour.
fn compress_pass(
    stack: VecDeque<Box<dyn Action>>,
    window_ms: u64,
) -> VecDeque<Box<dyn Action>> {
    let mut out: VecDeque<Box<dyn Action>> = VecDeque::with_capacity(stack.len());
    for entry in stack {
        match out.pop_back() {
            Some(top) if can_group(top.as_ref(), entry.as_ref(), window_ms) => {
                out.push_back(fold(top, entry));
            }
            Some(top) => {
                out.push_back(top);
                out.push_back(entry);
            }
            None => out.push_back(entry),
        }
    }
    out
}
