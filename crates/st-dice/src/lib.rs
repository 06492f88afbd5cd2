//! Dice resolution for the Spieltisch virtual tabletop.
//!
//! Resolves roll requests made of roll groups and command sets into
//! immutable [`RollResult`] records. A resolved result carries every drawn
//! face value, so peers can display it identically without rolling again.
//! Randomness is always injected: pass an [`rand::Rng`] to [`roll`] or a
//! face source closure to [`roll_with`].

pub mod dice;
pub mod error;
pub mod format;
pub mod resolve;

pub use dice::{
    CommandResult, CommandSetId, CommandSetResult, DiceCommand, DicePool, RollGroupResult,
    RollOptions, RollResult,
};
pub use error::{DiceError, DiceResult};
pub use format::{
    DisplayState, SimplifiedRollGroup, format_detailed_result, format_labels, format_listed,
    format_summed, simplify_rolls,
};
pub use resolve::{RollGroup, roll, roll_with};
