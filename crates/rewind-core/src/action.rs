#![forbid(unsafe_code)]

//! The reversible action abstraction.
//!
//! An [`Action`] owns everything needed to perform a mutation and to take it
//! back again. The engine never looks at the document; it only calls
//! [`Action::apply`] and [`Action::revert`] in the right order.
//!
//! # Invariants
//!
//! - `apply()` followed by `revert()` restores the state seen at construction
//! - `revert()` followed by `apply()` restores the post-mutation state
//! - neither is validated by the engine; a mismatched pair is a caller bug
//!
//! # Failure Modes
//!
//! - **Stale target**: the entity was removed by something outside history
//!   - Mitigation: return [`ActionError::TargetNotFound`] from the callback
//! - **State drift**: an external edit invalidated the captured old value
//!   - Mitigation: capture owned value snapshots, never live references

use std::fmt;

use crate::clock;
use crate::composite::CompositeAction;
use crate::error::ActionResult;

/// Metadata attached to every action for grouping and UI display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMetadata {
    /// Free-form category tag (e.g. `"edit"`, `"move"`).
    pub kind: String,
    /// Human-readable description for undo/redo menus.
    pub description: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ActionMetadata {
    /// Create metadata stamped with the current wall-clock time.
    ///
    /// Use [`at`](Self::at) to stamp from another [`Clock`](crate::Clock).
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            timestamp: clock::now_ms(),
        }
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp = timestamp_ms;
        self
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.kind.len() + self.description.len()
    }
}

/// A reversible mutation.
///
/// Implementations hold owned snapshots of whatever they need; `apply` is
/// the forward (do/redo) direction and `revert` the backward (undo) one.
pub trait Action {
    /// Perform the forward effect. Called on execute and on redo.
    fn apply(&mut self) -> ActionResult;

    /// Reverse the forward effect. Called on undo.
    fn revert(&mut self) -> ActionResult;

    /// Kind, description and timestamp.
    fn metadata(&self) -> &ActionMetadata;

    /// Category tag used for grouping decisions.
    fn kind(&self) -> &str {
        &self.metadata().kind
    }

    /// Human-readable description.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Creation time in milliseconds since the Unix epoch.
    fn timestamp(&self) -> u64 {
        self.metadata().timestamp
    }

    /// Estimated size of this action in bytes.
    fn size_bytes(&self) -> usize;

    /// Borrow as a composite, if this action is one.
    fn as_composite(&self) -> Option<&CompositeAction> {
        None
    }

    /// Mutably borrow as a composite, if this action is one.
    fn as_composite_mut(&mut self) -> Option<&mut CompositeAction> {
        None
    }

    /// Type name used by the `Debug` impl of `dyn Action`.
    fn debug_name(&self) -> &'static str {
        "Action"
    }
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("kind", &self.kind())
            .field("description", &self.description())
            .field("timestamp", &self.timestamp())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// Callback type for either direction of an [`FnAction`].
pub type ActionFn = Box<dyn FnMut() -> ActionResult>;

/// Action backed by a pair of closures.
///
/// The closures carry all mutation state; this is the general-purpose
/// shape when none of the built-in constructors fit.
pub struct FnAction {
    metadata: ActionMetadata,
    apply: ActionFn,
    revert: ActionFn,
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl FnAction {
    /// Create an action from forward and backward closures.
    pub fn new<A, R>(
        kind: impl Into<String>,
        description: impl Into<String>,
        apply: A,
        revert: R,
    ) -> Self
    where
        A: FnMut() -> ActionResult + 'static,
        R: FnMut() -> ActionResult + 'static,
    {
        Self {
            metadata: ActionMetadata::new(kind, description),
            apply: Box::new(apply),
            revert: Box::new(revert),
        }
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.metadata.timestamp = timestamp_ms;
        self
    }
}

impl Action for FnAction {
    fn apply(&mut self) -> ActionResult {
        (self.apply)()
    }

    fn revert(&mut self) -> ActionResult {
        (self.revert)()
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn debug_name(&self) -> &'static str {
        "FnAction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn metadata_size_includes_strings() {
        let meta = ActionMetadata::new("edit", "Rename node");
        assert!(
            meta.size_bytes() >= std::mem::size_of::<ActionMetadata>() + "edit".len() + 11
        );
    }

    #[test]
    fn metadata_at_overrides_timestamp() {
        let meta = ActionMetadata::new("edit", "x").at(42);
        assert_eq!(meta.timestamp, 42);
    }

    #[test]
    fn fn_action_runs_closures() {
        let value = Rc::new(RefCell::new(0));
        let (a, r) = (value.clone(), value.clone());
        let mut action = FnAction::new(
            "edit",
            "Set to 7",
            move || {
                *a.borrow_mut() = 7;
                Ok(())
            },
            move || {
                *r.borrow_mut() = 0;
                Ok(())
            },
        );

        action.apply().unwrap();
        assert_eq!(*value.borrow(), 7);
        action.revert().unwrap();
        assert_eq!(*value.borrow(), 0);
        assert_eq!(action.kind(), "edit");
        assert_eq!(action.description(), "Set to 7");
    }

    #[test]
    fn fn_action_propagates_errors() {
        let mut action = FnAction::new(
            "edit",
            "fails",
            || Err(ActionError::other("nope")),
            || Ok(()),
        );
        assert_eq!(action.apply(), Err(ActionError::other("nope")));
        assert!(action.revert().is_ok());
    }

    #[test]
    fn debug_for_dyn_action() {
        let action: Box<dyn Action> = Box::new(FnAction::new("move", "Move", || Ok(()), || Ok(())));
        let debug = format!("{action:?}");
        assert!(debug.contains("FnAction"));
        assert!(debug.contains("move"));
        assert!(action.as_composite().is_none());
    }
}
