#![forbid(unsafe_code)]

//! Reversible actions for the Rewind undo/redo engine.
//!
//! This crate defines what a history entry *is*; `rewind-engine` decides
//! where entries live and when they run.
//!
//! - [`Action`]: a mutation with a forward (`apply`) and backward (`revert`)
//!   operation, plus kind/description/timestamp metadata
//! - [`FnAction`]: an action made from two closures
//! - [`CompositeAction`]: an ordered group undone in reverse, redone forward
//! - [`builtin`]: edit, delete, move, create and property-change actions
//! - [`Clock`]: millisecond time source for timestamps
//!
//! # Why Actions Own Callbacks
//!
//! An action cannot borrow the document it mutates: it is stored in history
//! long after the borrow would end. Instead it owns value snapshots and
//! callbacks supplied by the host, which in turn hold whatever shared handle
//! (`Rc<RefCell<_>>`, an id into an arena) the host uses for its document.

pub mod action;
pub mod builtin;
pub mod clock;
pub mod composite;
pub mod error;

pub use action::{Action, ActionFn, ActionMetadata, FnAction};
pub use builtin::{
    CreateAction, DeleteAction, EditAction, Entity, MoveAction, Placement, PropertyAction,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use composite::CompositeAction;
pub use error::{ActionError, ActionResult};

/// Kind tags used by the built-in actions.
///
/// Kinds are free-form; the engine only compares them for equality.
pub mod kinds {
    pub const EDIT: &str = "edit";
    pub const DELETE: &str = "delete";
    pub const MOVE: &str = "move";
    pub const CREATE: &str = "create";
    pub const PROPERTY_CHANGE: &str = "property-change";
    /// Sealed entries produced by transactions and batches.
    pub const TRANSACTION: &str = "transaction";
}
