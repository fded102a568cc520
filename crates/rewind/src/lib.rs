#![forbid(unsafe_code)]

//! Rewind public facade crate.
//!
//! Re-exports the action model from `rewind-core` and the history engine
//! from `rewind-engine`, plus a prelude for host applications.
//!
//! ```ignore
//! use rewind::prelude::*;
//!
//! let engine = UndoEngine::new(EngineConfig::default());
//! engine.execute_action(PropertyAction::new("zoom", 1.0, 1.5, move |z| {
//!     view.borrow_mut().set_zoom(*z);
//!     Ok(())
//! }))?;
//! assert!(engine.can_undo());
//! ```

// --- Action re-exports -----------------------------------------------------

pub use rewind_core::{
    Action, ActionError, ActionFn, ActionMetadata, ActionResult, Clock, CompositeAction,
    CreateAction, DeleteAction, EditAction, Entity, FnAction, ManualClock, MoveAction, Placement,
    PropertyAction, SystemClock, kinds,
};

// --- Engine re-exports -----------------------------------------------------

pub use rewind_engine::{
    ConfigError, EngineConfig, EngineStats, Executed, HistorySize, HistorySnapshot,
    TransactionScope, UndoEngine,
};

pub use rewind_core as core;
pub use rewind_engine as engine;

/// Everything a host needs to record and replay edits.
pub mod prelude {
    pub use crate::{
        Action, ActionError, ActionResult, CompositeAction, CreateAction, DeleteAction,
        EditAction, EngineConfig, Entity, Executed, FnAction, MoveAction, Placement,
        PropertyAction, UndoEngine,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn prelude_covers_a_round_trip() {
        let zoom = Rc::new(RefCell::new(1.0_f64));
        let z = zoom.clone();
        let engine = UndoEngine::new(EngineConfig::default());
        engine
            .execute_action(PropertyAction::new("zoom", 1.0, 1.5, move |v: &f64| {
                *z.borrow_mut() = *v;
                Ok(())
            }))
            .unwrap();
        assert_eq!(*zoom.borrow(), 1.5);
        assert_eq!(engine.undo_description().as_deref(), Some("Change zoom"));
        assert!(engine.undo());
        assert_eq!(*zoom.borrow(), 1.0);
    }

    #[test]
    fn module_aliases_resolve() {
        let _ = crate::engine::EngineConfig::default();
        assert_eq!(crate::core::kinds::TRANSACTION, "transaction");
    }
}
