#![forbid(unsafe_code)]

//! Transactional undo/redo engine.
//!
//! [`UndoEngine`] records [`Action`](rewind_core::Action)s after running
//! their forward effect, and replays them backward (undo) or forward (redo)
//! on demand:
//!
//! - **Grouping**: same-kind actions inside a time window fold into one step
//! - **Transactions**: caller-delimited spans recorded as one sealed entry
//! - **Bounded history**: the oldest entry is evicted past the cap
//! - **Failure preservation**: a failed undo/redo leaves the entry in place
//! - **Re-entrancy guard**: nested calls from inside a callback are no-ops
//!
//! # Quick Start
//!
//! ```ignore
//! use rewind_core::EditAction;
//! use rewind_engine::{EngineConfig, UndoEngine};
//!
//! let engine = UndoEngine::new(EngineConfig::default());
//! engine.execute_action(EditAction::new("Untitled", "Chapter 1", move |text| {
//!     doc.borrow_mut().rename(node, text)
//! }))?;
//!
//! engine.undo(); // back to "Untitled"
//! engine.redo(); // "Chapter 1" again
//! ```
//!
//! # Logging
//!
//! Every state change emits a `tracing` event under the `rewind.engine`
//! target; replay failures are logged at `WARN`. No subscriber is installed.

pub mod config;
pub mod engine;
mod group;
pub mod snapshot;
pub mod transaction;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Executed, UndoEngine};
pub use snapshot::{EngineStats, HistorySize, HistorySnapshot};
pub use transaction::TransactionScope;
