#![forbid(unsafe_code)]

//! Explicit transactions.
//!
//! While a transaction is open every executed action still runs immediately
//! but is parked in a [`Transaction`] buffer instead of the undo stack. The
//! outermost `end_transaction` wraps the buffer into one sealed composite.
//!
//! Cancelling discards the buffer *without* reverting what already ran.
//! Hosts that need the document restored call
//! [`UndoEngine::rollback_transaction`] instead.

use rewind_core::{Action, ActionError, ActionResult};

use crate::engine::{Executed, UndoEngine};

/// Buffer of actions executed while a transaction is open.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    pub(crate) actions: Vec<Box<dyn Action>>,
    /// Number of `begin_transaction` calls not yet matched by an end.
    pub(crate) depth: usize,
}

impl Transaction {
    pub(crate) fn open() -> Self {
        Self {
            actions: Vec::new(),
            depth: 1,
        }
    }

    pub(crate) fn size_bytes(&self) -> usize {
        self.actions.iter().map(|a| a.size_bytes()).sum()
    }
}

/// RAII handle for a transaction.
///
/// [`commit`](Self::commit) ends the transaction with the scope's
/// description. Dropping the scope without committing cancels it, which
/// discards the buffer (and any enclosing one) without rolling back.
///
/// ```ignore
/// let tx = engine.transaction("Drag to reparent");
/// tx.execute(Box::new(move_action))?;
/// tx.execute(Box::new(reindex_action))?;
/// tx.commit();
/// ```
#[must_use = "dropping a TransactionScope cancels the transaction"]
pub struct TransactionScope<'a> {
    engine: &'a UndoEngine,
    description: String,
    finished: bool,
}

impl<'a> TransactionScope<'a> {
    pub(crate) fn begin(engine: &'a UndoEngine, description: String) -> Self {
        engine.begin_transaction();
        Self {
            engine,
            description,
            finished: false,
        }
    }

    /// Execute an action inside the transaction.
    pub fn execute(&self, action: Box<dyn Action>) -> Result<Executed, ActionError> {
        self.engine.execute(action)
    }

    /// End the transaction. Returns `true` if an undo entry was recorded.
    pub fn commit(mut self) -> bool {
        self.finished = true;
        self.engine.end_transaction(&self.description)
    }

    /// Discard the buffer without reverting anything.
    pub fn cancel(mut self) {
        self.finished = true;
        self.engine.cancel_transaction();
    }

    /// Revert everything executed in the transaction, newest first.
    pub fn rollback(mut self) -> ActionResult {
        self.finished = true;
        self.engine.rollback_transaction()
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.engine.cancel_transaction();
        }
    }
}
