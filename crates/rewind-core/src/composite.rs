#![forbid(unsafe_code)]

//! Ordered groups of actions that undo and redo as one unit.
//!
//! Children are stored in application order. Reverting walks them from the
//! last to the first; applying walks them from the first to the last. Later
//! children may depend on state produced by earlier ones ("move then
//! rename" must be undone as "un-rename then un-move"), so no other order
//! is valid.
//!
//! ```text
//! children:  [c1, c2, c3]
//! apply():   c1.apply  -> c2.apply  -> c3.apply
//! revert():  c3.revert -> c2.revert -> c1.revert
//! ```
//!
//! If a child fails part-way through a pass, the children already handled
//! in that pass are walked back in the opposite direction before the error
//! is returned. A failed composite therefore leaves the document where the
//! pass started and can stay on its stack for a retry.

use std::fmt;

use crate::action::{Action, ActionMetadata};
use crate::error::ActionResult;
use crate::kinds;

/// A group of actions treated as one indivisible history entry.
pub struct CompositeAction {
    metadata: ActionMetadata,
    children: Vec<Box<dyn Action>>,
    sealed: bool,
}

impl fmt::Debug for CompositeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAction")
            .field("metadata", &self.metadata)
            .field("children", &self.children.len())
            .field("sealed", &self.sealed)
            .finish()
    }
}

impl CompositeAction {
    /// Create an empty, open composite.
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            metadata: ActionMetadata::new(kind, description),
            children: Vec::new(),
            sealed: false,
        }
    }

    /// Start a group from a single action.
    ///
    /// The group inherits the action's kind, description and timestamp, so
    /// it keeps matching later actions of the same kind.
    #[must_use]
    pub fn wrap(first: Box<dyn Action>) -> Self {
        Self {
            metadata: first.metadata().clone(),
            children: vec![first],
            sealed: false,
        }
    }

    /// Build a sealed transaction entry from already-applied children.
    #[must_use]
    pub fn transaction(description: impl Into<String>, children: Vec<Box<dyn Action>>) -> Self {
        let mut composite = Self::new(kinds::TRANSACTION, description);
        composite.children = children;
        composite.sealed = true;
        composite
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.metadata.timestamp = timestamp_ms;
        self
    }

    /// Append a child. The group timestamp follows the newest child.
    pub fn push(&mut self, child: Box<dyn Action>) {
        self.metadata.timestamp = self.metadata.timestamp.max(child.timestamp());
        self.children.push(child);
    }

    /// Append `other`, moving its children in when it is an open composite.
    ///
    /// Flattening keeps the undo order intact: reverting `[a1, a2, b1, b2]`
    /// backwards is the same as reverting `b` and then `a`.
    pub fn absorb(&mut self, mut other: Box<dyn Action>) {
        if other.as_composite().is_none_or(CompositeAction::is_sealed) {
            self.push(other);
            return;
        }
        if let Some(group) = other.as_composite_mut() {
            let stamp = group.timestamp();
            for child in group.take_children() {
                self.push(child);
            }
            self.metadata.timestamp = self.metadata.timestamp.max(stamp);
        }
    }

    /// Remove and return all children, leaving the composite empty.
    pub fn take_children(&mut self) -> Vec<Box<dyn Action>> {
        std::mem::take(&mut self.children)
    }

    /// Mark the composite as closed to further grouping.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether grouping and compression must leave this entry alone.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the composite has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Descriptions of the direct children, in application order.
    pub fn child_descriptions(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|c| c.description())
    }
}

impl Action for CompositeAction {
    fn apply(&mut self) -> ActionResult {
        for i in 0..self.children.len() {
            if let Err(err) = self.children[i].apply() {
                for child in self.children[..i].iter_mut().rev() {
                    if let Err(undo_err) = child.revert() {
                        tracing::warn!(
                            target: "rewind.core",
                            child = %child.description(),
                            error = %undo_err,
                            "composite compensation failed"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn revert(&mut self) -> ActionResult {
        for i in (0..self.children.len()).rev() {
            if let Err(err) = self.children[i].revert() {
                for child in self.children[i + 1..].iter_mut() {
                    if let Err(redo_err) = child.apply() {
                        tracing::warn!(
                            target: "rewind.core",
                            child = %child.description(),
                            error = %redo_err,
                            "composite compensation failed"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.children.iter().map(|c| c.size_bytes()).sum::<usize>()
    }

    fn as_composite(&self) -> Option<&CompositeAction> {
        Some(self)
    }

    fn as_composite_mut(&mut self) -> Option<&mut CompositeAction> {
        Some(self)
    }

    fn debug_name(&self) -> &'static str {
        "CompositeAction"
    }
}
