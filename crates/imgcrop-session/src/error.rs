//! Error types for the edit session
//!
//! None of these reach the session owner: catalog failures are recovered
//! inside the controller and illegal transitions are dropped as no-ops.

use crate::state::EditPhase;

/// Media catalog failures (distinct from "not found", which is `Ok(None)`)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Transport-level failure
    #[error("catalog transport failed: {0}")]
    Transport(String),

    /// Catalog temporarily unavailable
    #[error("catalog unavailable")]
    Unavailable,

    /// Request timed out in the catalog client
    #[error("catalog request timed out after {after_ms}ms")]
    Timeout {
        /// Elapsed time
        after_ms: u64,
    },
}

impl CatalogError {
    /// Create transport error
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Edit phase transition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition not in the phase table
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current phase
        from: EditPhase,
        /// Requested phase
        to: EditPhase,
    },
}
