#![forbid(unsafe_code)]

//! Built-in actions for the common mutation archetypes.
//!
//! Each constructor takes owned snapshots of the values involved plus the
//! host callbacks that actually touch the document. The action only decides
//! which value goes to which callback in which direction:
//!
//! | Action | `apply` | `revert` |
//! |---|---|---|
//! | [`EditAction`] | `update(new)` | `update(old)` |
//! | [`DeleteAction`] | `remove(id)` | `restore(entity)` |
//! | [`MoveAction`] | `reposition(id, to)` | `reposition(id, from)` |
//! | [`CreateAction`] | `insert(entity)` | `remove(id)` |
//! | [`PropertyAction`] | `set(new)` | `set(old)` |
//!
//! Callbacks are assumed to be pure functions of their arguments; anything
//! they read from elsewhere can drift between execute and undo.

use std::fmt;

use crate::action::{Action, ActionMetadata};
use crate::error::ActionResult;
use crate::kinds;

/// Something in the document with a stable identity.
pub trait Entity {
    /// Identifier type.
    type Id: Clone + fmt::Debug;

    /// The entity's identifier.
    fn id(&self) -> Self::Id;
}

/// Callback receiving a text value.
pub type TextFn = Box<dyn FnMut(&str) -> ActionResult>;
/// Callback receiving an entity.
pub type EntityFn<E> = Box<dyn FnMut(&E) -> ActionResult>;
/// Callback receiving an entity id.
pub type IdFn<Id> = Box<dyn FnMut(&Id) -> ActionResult>;
/// Callback moving `id` under `parent` at `index`.
pub type RepositionFn<Id> = Box<dyn FnMut(&Id, Option<&Id>, usize) -> ActionResult>;
/// Callback receiving a property value.
pub type SetterFn<V> = Box<dyn FnMut(&V) -> ActionResult>;

macro_rules! metadata_builders {
    () => {
        /// Replace the default description.
        #[must_use]
        pub fn with_description(mut self, description: impl Into<String>) -> Self {
            self.metadata.description = description.into();
            self
        }

        /// Override the creation timestamp.
        #[must_use]
        pub fn at(mut self, timestamp_ms: u64) -> Self {
            self.metadata.timestamp = timestamp_ms;
            self
        }
    };
}

// ============================================================================
// Edit
// ============================================================================

/// Replace a text value (rename, label edit).
pub struct EditAction {
    /// Text before the edit.
    pub old_text: String,
    /// Text after the edit.
    pub new_text: String,
    metadata: ActionMetadata,
    update: TextFn,
}

impl fmt::Debug for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditAction")
            .field("old_text", &self.old_text)
            .field("new_text", &self.new_text)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl EditAction {
    /// Create an edit from `old_text` to `new_text`.
    pub fn new<F>(old_text: impl Into<String>, new_text: impl Into<String>, update: F) -> Self
    where
        F: FnMut(&str) -> ActionResult + 'static,
    {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
            metadata: ActionMetadata::new(kinds::EDIT, "Edit text"),
            update: Box::new(update),
        }
    }

    metadata_builders!();
}

impl Action for EditAction {
    fn apply(&mut self) -> ActionResult {
        (self.update)(&self.new_text)
    }

    fn revert(&mut self) -> ActionResult {
        (self.update)(&self.old_text)
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.old_text.len()
            + self.new_text.len()
            + self.metadata.size_bytes()
    }

    fn debug_name(&self) -> &'static str {
        "EditAction"
    }
}

// ============================================================================
// Delete
// ============================================================================

/// Remove an entity; undo restores the full snapshot.
pub struct DeleteAction<E: Entity> {
    /// Snapshot of the removed entity.
    pub entity: E,
    metadata: ActionMetadata,
    restore: EntityFn<E>,
    remove: IdFn<E::Id>,
}

impl<E: Entity + fmt::Debug> fmt::Debug for DeleteAction<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteAction")
            .field("entity", &self.entity)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> DeleteAction<E> {
    /// Create a delete of `entity`.
    pub fn new<R, D>(entity: E, restore: R, remove: D) -> Self
    where
        R: FnMut(&E) -> ActionResult + 'static,
        D: FnMut(&E::Id) -> ActionResult + 'static,
    {
        Self {
            entity,
            metadata: ActionMetadata::new(kinds::DELETE, "Delete"),
            restore: Box::new(restore),
            remove: Box::new(remove),
        }
    }

    metadata_builders!();
}

impl<E: Entity> Action for DeleteAction<E> {
    fn apply(&mut self) -> ActionResult {
        (self.remove)(&self.entity.id())
    }

    fn revert(&mut self) -> ActionResult {
        (self.restore)(&self.entity)
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn debug_name(&self) -> &'static str {
        "DeleteAction"
    }
}

// ============================================================================
// Move
// ============================================================================

/// Where a node sits: its parent (`None` for top level) and sibling index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<Id> {
    pub parent: Option<Id>,
    pub index: usize,
}

impl<Id> Placement<Id> {
    /// Placement under `parent` at `index`.
    #[must_use]
    pub fn new(parent: Option<Id>, index: usize) -> Self {
        Self { parent, index }
    }
}

/// Reparent and/or reorder a node.
pub struct MoveAction<Id> {
    /// The node being moved.
    pub id: Id,
    /// Placement before the move.
    pub from: Placement<Id>,
    /// Placement after the move.
    pub to: Placement<Id>,
    metadata: ActionMetadata,
    reposition: RepositionFn<Id>,
}

impl<Id: fmt::Debug> fmt::Debug for MoveAction<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveAction")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<Id> MoveAction<Id> {
    /// Create a move of `id` from `from` to `to`.
    pub fn new<F>(id: Id, from: Placement<Id>, to: Placement<Id>, reposition: F) -> Self
    where
        F: FnMut(&Id, Option<&Id>, usize) -> ActionResult + 'static,
    {
        Self {
            id,
            from,
            to,
            metadata: ActionMetadata::new(kinds::MOVE, "Move"),
            reposition: Box::new(reposition),
        }
    }

    metadata_builders!();
}

impl<Id> Action for MoveAction<Id> {
    fn apply(&mut self) -> ActionResult {
        (self.reposition)(&self.id, self.to.parent.as_ref(), self.to.index)
    }

    fn revert(&mut self) -> ActionResult {
        (self.reposition)(&self.id, self.from.parent.as_ref(), self.from.index)
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn debug_name(&self) -> &'static str {
        "MoveAction"
    }
}

// ============================================================================
// Create
// ============================================================================

/// Insert a new entity; undo removes it again.
pub struct CreateAction<E: Entity> {
    /// Snapshot of the created entity.
    pub entity: E,
    metadata: ActionMetadata,
    remove: IdFn<E::Id>,
    insert: EntityFn<E>,
}

impl<E: Entity + fmt::Debug> fmt::Debug for CreateAction<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAction")
            .field("entity", &self.entity)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> CreateAction<E> {
    /// Create an insert of `entity`.
    pub fn new<D, I>(entity: E, remove: D, insert: I) -> Self
    where
        D: FnMut(&E::Id) -> ActionResult + 'static,
        I: FnMut(&E) -> ActionResult + 'static,
    {
        Self {
            entity,
            metadata: ActionMetadata::new(kinds::CREATE, "Create"),
            remove: Box::new(remove),
            insert: Box::new(insert),
        }
    }

    metadata_builders!();
}

impl<E: Entity> Action for CreateAction<E> {
    fn apply(&mut self) -> ActionResult {
        (self.insert)(&self.entity)
    }

    fn revert(&mut self) -> ActionResult {
        (self.remove)(&self.entity.id())
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn debug_name(&self) -> &'static str {
        "CreateAction"
    }
}

// ============================================================================
// Property change
// ============================================================================

/// Change a single scalar attribute.
pub struct PropertyAction<V> {
    /// Attribute name, used in the default description.
    pub name: String,
    /// Value before the change.
    pub old_value: V,
    /// Value after the change.
    pub new_value: V,
    metadata: ActionMetadata,
    set: SetterFn<V>,
}

impl<V: fmt::Debug> fmt::Debug for PropertyAction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAction")
            .field("name", &self.name)
            .field("old_value", &self.old_value)
            .field("new_value", &self.new_value)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<V> PropertyAction<V> {
    /// Create a change of `name` from `old_value` to `new_value`.
    pub fn new<F>(name: impl Into<String>, old_value: V, new_value: V, set: F) -> Self
    where
        F: FnMut(&V) -> ActionResult + 'static,
    {
        let name = name.into();
        let description = format!("Change {name}");
        Self {
            name,
            old_value,
            new_value,
            metadata: ActionMetadata::new(kinds::PROPERTY_CHANGE, description),
            set: Box::new(set),
        }
    }

    metadata_builders!();
}

impl<V> Action for PropertyAction<V> {
    fn apply(&mut self) -> ActionResult {
        (self.set)(&self.new_value)
    }

    fn revert(&mut self) -> ActionResult {
        (self.set)(&self.old_value)
    }

    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.len() + self.metadata.size_bytes()
    }

    fn debug_name(&self) -> &'static str {
        "PropertyAction"
    }
}
