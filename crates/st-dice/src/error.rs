//! Error types for dice resolution.

use crate::dice::DiceCommand;

/// Errors that can occur while resolving a roll request.
#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    /// A roll group references a command set that is not in the registry.
    #[error("unknown command set: {0}")]
    UnknownCommandSet(String),

    /// A face source produced a value outside the die's face range.
    #[error("face value {value} is out of range for {command}")]
    FaceOutOfRange {
        /// The command that was drawn.
        command: DiceCommand,
        /// The offending value.
        value: i32,
    },
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
