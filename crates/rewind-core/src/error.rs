#![forbid(unsafe_code)]

//! Failure type shared by every action callback.

use thiserror::Error;

/// Result of applying or reverting an action.
///
/// Callbacks may fail if their target is gone or the document has drifted
/// away from the snapshot the action was built from.
pub type ActionResult = Result<(), ActionError>;

/// Errors that can occur while applying or reverting an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The entity the action operates on no longer exists.
    #[error("target {0} not found")]
    TargetNotFound(String),
    /// Document state no longer matches what the action captured.
    #[error("state drift: expected '{expected}', got '{actual}'")]
    StateDrift { expected: String, actual: String },
    /// The action cannot run in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl ActionError {
    /// Shorthand for [`ActionError::Other`].
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Shorthand for [`ActionError::TargetNotFound`] from any displayable id.
    #[must_use]
    pub fn target_not_found(id: impl std::fmt::Display) -> Self {
        Self::TargetNotFound(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ActionError::target_not_found(42);
        assert_eq!(err.to_string(), "target 42 not found");

        let err = ActionError::StateDrift {
            expected: "abc".into(),
            actual: "abd".into(),
        };
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("'abd'"));

        assert_eq!(ActionError::other("boom").to_string(), "boom");
        assert_eq!(
            ActionError::InvalidState("locked".into()).to_string(),
            "invalid state: locked"
        );
    }
}
