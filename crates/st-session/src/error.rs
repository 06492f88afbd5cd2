//! Error types for the session engine.

use thiserror::Error;

use crate::member::MemberId;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur in the session engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A roll request could not be resolved.
    #[error("roll failed: {0}")]
    Dice(#[from] st_dice::DiceError),

    /// A reconciliation payload was missing or not a session.
    #[error("malformed reconciliation payload: {0}")]
    MalformedReconciliationPayload(String),

    /// An operation targeted an id that is not in the roster.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// A peer message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}
