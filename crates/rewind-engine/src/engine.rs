#![forbid(unsafe_code)]

//! The undo engine.
//!
//! [`UndoEngine`] owns two stacks and an optional transaction buffer:
//!
//! ```text
//! execute(a5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3, a4, a5]              │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3]                      │
//! │ Redo Stack: [a4, a5]                          │
//! └───────────────────────────────────────────────┘
//!
//! execute(a6)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3, a6]                  │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `undo_stack.len() <= config.max_history_size` after every operation
//! 2. the redo stack is cleared whenever a new action is executed
//! 3. an action whose replay fails goes back to the stack it came from
//! 4. `executing` is set exactly while an action callback is running
//!
//! # Re-entrancy
//!
//! The API takes `&self` so a host can share the engine (`Rc<UndoEngine>`)
//! with the callbacks it stores in actions. No internal borrow is held while
//! a callback runs. A call that arrives while another call is running its
//! callback is a no-op: `execute` reports [`Executed::Skipped`], `undo` and
//! `redo` return `false`, and transaction lifecycle calls are ignored.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use rewind_core::{
    Action, ActionError, ActionResult, Clock, CompositeAction, SystemClock,
};

use crate::config::EngineConfig;
use crate::group;
use crate::snapshot::{EngineStats, HistorySize, HistorySnapshot};
use crate::transaction::{Transaction, TransactionScope};

const TARGET: &str = "rewind.engine";

/// What `execute` did with an action whose forward effect succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executed {
    /// Pushed as a new undo entry.
    Recorded,
    /// Folded into the entry on top of the undo stack.
    Grouped,
    /// Parked in the open transaction.
    Buffered,
    /// Re-entrant call; the action was neither run nor recorded.
    Skipped,
}

type TruncationListener = Box<dyn FnMut(&str)>;

#[derive(Default)]
struct History {
    /// Newest at back.
    undo_stack: VecDeque<Box<dyn Action>>,
    /// Most recently undone at back.
    redo_stack: VecDeque<Box<dyn Action>>,
    transaction: Option<Transaction>,
    evicted_total: u64,
    last_failure: Option<String>,
}

/// Clears the `executing` flag on scope exit, including unwinds.
struct ExecutingGuard<'a>(&'a Cell<bool>);

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Transactional undo/redo engine.
pub struct UndoEngine {
    history: RefCell<History>,
    executing: Cell<bool>,
    config: EngineConfig,
    clock: Box<dyn Clock>,
    truncation_listener: RefCell<Option<TruncationListener>>,
}

impl fmt::Debug for UndoEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("UndoEngine");
        if let Ok(history) = self.history.try_borrow() {
            s.field("undo_depth", &history.undo_stack.len())
                .field("redo_depth", &history.redo_stack.len())
                .field("transaction_open", &history.transaction.is_some());
        }
        s.field("executing", &self.executing.get())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl UndoEngine {
    /// Create an engine using the system clock.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create an engine with a custom clock.
    ///
    /// The engine clock stamps committed transactions and is "now" for the
    /// ages in [`stats`](Self::stats). Individual actions carry the stamp
    /// they were built with (the wall clock, unless overridden with `.at()`),
    /// so a host driving a [`ManualClock`](rewind_core::ManualClock) should
    /// stamp its actions from the same clock.
    ///
    /// A `max_history_size` of zero would drop every entry; it is raised to
    /// 1 with a warning.
    #[must_use]
    pub fn with_clock(mut config: EngineConfig, clock: impl Clock + 'static) -> Self {
        if config.max_history_size == 0 {
            tracing::warn!(target: TARGET, "max_history_size of 0 raised to 1");
            config.max_history_size = 1;
        }
        Self {
            history: RefCell::new(History::default()),
            executing: Cell::new(false),
            config,
            clock: Box::new(clock),
            truncation_listener: RefCell::new(None),
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a callback that receives the description of every entry
    /// dropped by the history cap.
    pub fn set_truncation_listener<F>(&self, listener: F)
    where
        F: FnMut(&str) + 'static,
    {
        *self.truncation_listener.borrow_mut() = Some(Box::new(listener));
    }

    fn enter(&self) -> Option<ExecutingGuard<'_>> {
        if self.executing.replace(true) {
            return None;
        }
        Some(ExecutingGuard(&self.executing))
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Perform an action's forward effect and record it.
    ///
    /// A failing forward effect is returned to the caller and nothing is
    /// recorded. Otherwise the redo stack is cleared and the action is
    /// buffered (open transaction), grouped into the top entry, or pushed.
    pub fn execute(&self, mut action: Box<dyn Action>) -> Result<Executed, ActionError> {
        let Some(_guard) = self.enter() else {
            tracing::debug!(
                target: TARGET,
                description = %action.description(),
                "re-entrant execute ignored"
            );
            return Ok(Executed::Skipped);
        };

        action.apply()?;

        let (outcome, evicted) = {
            let mut history = self.history.borrow_mut();
            history.redo_stack.clear();
            if let Some(tx) = history.transaction.as_mut() {
                tx.actions.push(action);
                (Executed::Buffered, Vec::new())
            } else {
                self.record(&mut history, action)
            }
        };
        tracing::debug!(target: TARGET, outcome = ?outcome, "execute");
        self.notify_evicted(evicted);
        Ok(outcome)
    }

    /// [`execute`](Self::execute) for an unboxed action.
    pub fn execute_action<A>(&self, action: A) -> Result<Executed, ActionError>
    where
        A: Action + 'static,
    {
        self.execute(Box::new(action))
    }

    /// Execute several actions as one transaction.
    ///
    /// Stops at the first failing forward effect, cancels the transaction
    /// (effects already applied stay applied) and returns the error.
    /// Returns `Ok(true)` if an undo entry was recorded.
    pub fn execute_batch<I>(&self, actions: I, description: &str) -> Result<bool, ActionError>
    where
        I: IntoIterator<Item = Box<dyn Action>>,
    {
        if self.executing.get() {
            tracing::debug!(target: TARGET, "re-entrant execute_batch ignored");
            return Ok(false);
        }
        self.begin_transaction();
        for action in actions {
            if let Err(err) = self.execute(action) {
                tracing::warn!(
                    target: TARGET,
                    description = %description,
                    error = %err,
                    "batch aborted"
                );
                self.cancel_transaction();
                return Err(err);
            }
        }
        Ok(self.end_transaction(description))
    }

    fn record(&self, history: &mut History, action: Box<dyn Action>) -> (Executed, Vec<String>) {
        if self.config.grouping_enabled
            && let Some(top) = history.undo_stack.back()
            && group::can_group(
                top.as_ref(),
                action.as_ref(),
                self.config.grouping_time_window_ms,
            )
            && let Some(top) = history.undo_stack.pop_back()
        {
            history.undo_stack.push_back(group::fold(top, action));
            return (Executed::Grouped, Vec::new());
        }
        history.undo_stack.push_back(action);
        (Executed::Recorded, self.enforce_limit(history))
    }

    /// Drop the oldest undo entries beyond the cap. Returns their descriptions.
    fn enforce_limit(&self, history: &mut History) -> Vec<String> {
        let mut evicted = Vec::new();
        while history.undo_stack.len() > self.config.max_history_size {
            if let Some(old) = history.undo_stack.pop_front() {
                evicted.push(old.description().to_string());
            }
        }
        history.evicted_total += evicted.len() as u64;
        evicted
    }

    fn notify_evicted(&self, evicted: Vec<String>) {
        if evicted.is_empty() {
            return;
        }
        for description in &evicted {
            tracing::debug!(
                target: TARGET,
                description = %description,
                max = self.config.max_history_size,
                "history truncated"
            );
        }
        // Take the listener out so it may call back into the engine.
        let listener = self.truncation_listener.borrow_mut().take();
        if let Some(mut listener) = listener {
            for description in &evicted {
                listener(description);
            }
            let mut slot = self.truncation_listener.borrow_mut();
            if slot.is_none() {
                *slot = Some(listener);
            }
        }
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Revert the newest undo entry and move it to the redo stack.
    ///
    /// Returns `false` with no state change if there is nothing to undo, a
    /// transaction is open, or another call is running. If the revert fails
    /// the entry goes back on top of the undo stack, the error is logged and
    /// kept in [`last_failure`](Self::last_failure), and `false` is returned.
    pub fn undo(&self) -> bool {
        self.replay(Direction::Undo)
    }

    /// Re-apply the most recently undone entry and move it back to the undo
    /// stack. Failure handling mirrors [`undo`](Self::undo).
    pub fn redo(&self) -> bool {
        self.replay(Direction::Redo)
    }

    fn replay(&self, direction: Direction) -> bool {
        if self.in_transaction() {
            tracing::warn!(
                target: TARGET,
                op = direction.name(),
                "refused while a transaction is open"
            );
            return false;
        }
        let Some(_guard) = self.enter() else {
            tracing::debug!(target: TARGET, op = direction.name(), "re-entrant call ignored");
            return false;
        };

        let popped = {
            let mut history = self.history.borrow_mut();
            match direction {
                Direction::Undo => history.undo_stack.pop_back(),
                Direction::Redo => history.redo_stack.pop_back(),
            }
        };
        let Some(mut action) = popped else {
            return false;
        };

        let _span = tracing::debug_span!(
            "engine.replay",
            op = direction.name(),
            description = %action.description(),
        )
        .entered();

        let result = match direction {
            Direction::Undo => action.revert(),
            Direction::Redo => action.apply(),
        };

        let mut history = self.history.borrow_mut();
        match result {
            Ok(()) => {
                tracing::debug!(target: TARGET, op = direction.name(), "replay succeeded");
                match direction {
                    Direction::Undo => history.redo_stack.push_back(action),
                    Direction::Redo => history.undo_stack.push_back(action),
                }
                history.last_failure = None;
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: TARGET,
                    op = direction.name(),
                    description = %action.description(),
                    error = %err,
                    "replay failed; entry kept"
                );
                match direction {
                    Direction::Undo => history.undo_stack.push_back(action),
                    Direction::Redo => history.redo_stack.push_back(action),
                }
                history.last_failure = Some(err.to_string());
                false
            }
        }
    }

    /// Message of the most recent failed undo/redo, cleared by the next
    /// successful one.
    #[must_use]
    pub fn last_failure(&self) -> Option<String> {
        self.history.borrow().last_failure.clone()
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Open a transaction, or nest one level deeper in the open one.
    pub fn begin_transaction(&self) {
        if self.executing.get() {
            tracing::debug!(target: TARGET, "re-entrant begin_transaction ignored");
            return;
        }
        let mut history = self.history.borrow_mut();
        match history.transaction.as_mut() {
            Some(tx) => tx.depth += 1,
            None => history.transaction = Some(Transaction::open()),
        }
        let depth = history.transaction.as_ref().map_or(0, |tx| tx.depth);
        tracing::debug!(target: TARGET, depth, "transaction begin");
    }

    /// Close one level of the open transaction.
    ///
    /// The outermost end wraps the buffered actions into one sealed undo
    /// entry described by `description` and returns `true`. An empty buffer
    /// is discarded silently. Inner ends and ends with no open transaction
    /// return `false`.
    pub fn end_transaction(&self, description: &str) -> bool {
        if self.executing.get() {
            tracing::debug!(target: TARGET, "re-entrant end_transaction ignored");
            return false;
        }
        let evicted = {
            let mut history = self.history.borrow_mut();
            let Some(tx) = history.transaction.as_mut() else {
                tracing::warn!(target: TARGET, description, "end_transaction without begin");
                return false;
            };
            if tx.depth > 1 {
                tx.depth -= 1;
                return false;
            }
            let Some(tx) = history.transaction.take() else {
                return false;
            };
            if tx.actions.is_empty() {
                tracing::debug!(target: TARGET, description, "empty transaction discarded");
                return false;
            }
            tracing::debug!(
                target: TARGET,
                description,
                actions = tx.actions.len(),
                "transaction committed"
            );
            let entry = CompositeAction::transaction(description, tx.actions)
                .at(self.clock.now_ms());
            history.undo_stack.push_back(Box::new(entry));
            self.enforce_limit(&mut history)
        };
        self.notify_evicted(evicted);
        true
    }

    /// Discard the open transaction without reverting anything it applied.
    pub fn cancel_transaction(&self) {
        if self.executing.get() {
            tracing::debug!(target: TARGET, "re-entrant cancel_transaction ignored");
            return;
        }
        if let Some(tx) = self.history.borrow_mut().transaction.take() {
            tracing::debug!(
                target: TARGET,
                discarded = tx.actions.len(),
                "transaction cancelled without rollback"
            );
        }
    }

    /// Discard the open transaction and revert what it applied, newest
    /// first. Stops at the first revert failure and returns it; the rest
    /// of the buffer is dropped unreverted.
    pub fn rollback_transaction(&self) -> ActionResult {
        let Some(_guard) = self.enter() else {
            tracing::debug!(target: TARGET, "re-entrant rollback_transaction ignored");
            return Ok(());
        };
        let Some(tx) = self.history.borrow_mut().transaction.take() else {
            return Ok(());
        };
        for mut action in tx.actions.into_iter().rev() {
            if let Err(err) = action.revert() {
                tracing::warn!(
                    target: TARGET,
                    description = %action.description(),
                    error = %err,
                    "transaction rollback failed"
                );
                return Err(err);
            }
        }
        tracing::debug!(target: TARGET, "transaction rolled back");
        Ok(())
    }

    /// Open a transaction that commits via the returned scope.
    pub fn transaction(&self, description: impl Into<String>) -> TransactionScope<'_> {
        TransactionScope::begin(self, description.into())
    }

    /// Whether a transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.history.borrow().transaction.is_some()
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Coalesce adjacent groupable undo entries. Returns how many entries
    /// were removed.
    pub fn compress(&self) -> usize {
        if self.executing.get() {
            return 0;
        }
        let mut history = self.history.borrow_mut();
        let before = history.undo_stack.len();
        let stack = std::mem::take(&mut history.undo_stack);
        history.undo_stack = group::compress(stack, self.config.grouping_time_window_ms);
        let removed = before - history.undo_stack.len();
        tracing::debug!(target: TARGET, before, removed, "compress");
        removed
    }

    /// Drop both stacks and any open transaction. Ignored while an action
    /// callback is running.
    pub fn clear(&self) {
        if self.executing.get() {
            tracing::debug!(target: TARGET, "re-entrant clear ignored");
            return;
        }
        let mut history = self.history.borrow_mut();
        history.undo_stack.clear();
        history.redo_stack.clear();
        history.transaction = None;
        history.last_failure = None;
        tracing::debug!(target: TARGET, "history cleared");
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Whether `undo()` would attempt anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.executing.get() && {
            let history = self.history.borrow();
            history.transaction.is_none() && !history.undo_stack.is_empty()
        }
    }

    /// Whether `redo()` would attempt anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.executing.get() && {
            let history = self.history.borrow();
            history.transaction.is_none() && !history.redo_stack.is_empty()
        }
    }

    /// Description of the entry `undo()` would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<String> {
        let history = self.history.borrow();
        history
            .undo_stack
            .back()
            .map(|a| a.description().to_string())
    }

    /// Description of the entry `redo()` would re-apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<String> {
        let history = self.history.borrow();
        history
            .redo_stack
            .back()
            .map(|a| a.description().to_string())
    }

    /// Undo descriptions, most recent first.
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        let history = self.history.borrow();
        history
            .undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|a| a.description().to_string())
            .collect()
    }

    /// Redo descriptions, most recent first.
    #[must_use]
    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        let history = self.history.borrow();
        history
            .redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|a| a.description().to_string())
            .collect()
    }

    /// Lengths of both stacks.
    #[must_use]
    pub fn history_size(&self) -> HistorySize {
        let history = self.history.borrow();
        HistorySize {
            undo: history.undo_stack.len(),
            redo: history.redo_stack.len(),
        }
    }

    /// Lossy snapshot: sizes and descriptions, bottom to top.
    #[must_use]
    pub fn serialize(&self) -> HistorySnapshot {
        let history = self.history.borrow();
        let describe = |stack: &VecDeque<Box<dyn Action>>| {
            stack
                .iter()
                .map(|a| a.description().to_string())
                .collect::<Vec<_>>()
        };
        HistorySnapshot {
            undo_size: history.undo_stack.len(),
            redo_size: history.redo_stack.len(),
            undo_descriptions: describe(&history.undo_stack),
            redo_descriptions: describe(&history.redo_stack),
            transaction_open: history.transaction.is_some(),
        }
    }

    /// [`serialize`](Self::serialize) rendered as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.serialize().to_json()
    }

    /// Sizes, memory estimate, and entry ages.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let now = self.clock.now_ms();
        let history = self.history.borrow();
        let stack_bytes = |stack: &VecDeque<Box<dyn Action>>| {
            stack.iter().map(|a| a.size_bytes()).sum::<usize>()
        };
        let ages: Vec<u64> = history
            .undo_stack
            .iter()
            .map(|a| now.saturating_sub(a.timestamp()))
            .collect();
        let average_age_ms = if ages.is_empty() {
            0.0
        } else {
            ages.iter().sum::<u64>() as f64 / ages.len() as f64
        };
        EngineStats {
            undo_size: history.undo_stack.len(),
            redo_size: history.redo_stack.len(),
            memory_estimate_bytes: stack_bytes(&history.undo_stack)
                + stack_bytes(&history.redo_stack)
                + history.transaction.as_ref().map_or(0, Transaction::size_bytes),
            average_age_ms,
            oldest_age_ms: ages.first().copied().unwrap_or(0),
            evicted_total: history.evicted_total,
            transaction_depth: history.transaction.as_ref().map_or(0, |tx| tx.depth),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}

impl Direction {
    fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}
