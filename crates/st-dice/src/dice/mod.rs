//! Dice commands and the command-set registry.
//!
//! A *command* is one draw of a single die: `1d6`, a Fate die, a coin. A
//! *command set* is a named pool shape made of one or more commands, such
//! as `2d6` or `4dF`. Ids coming from a request are resolved through
//! [`CommandSetId`]'s `FromStr`, which rejects anything outside the
//! registry.

pub mod pool;
pub mod roll;

pub use pool::DicePool;
pub use roll::{CommandResult, CommandSetResult, RollGroupResult, RollOptions, RollResult};

use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DiceError;

/// A single die draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceCommand {
    /// Four-sided die.
    #[serde(rename = "1d4")]
    D4,
    /// Six-sided die.
    #[serde(rename = "1d6")]
    D6,
    /// Eight-sided die.
    #[serde(rename = "1d8")]
    D8,
    /// Ten-sided die.
    #[serde(rename = "1d10")]
    D10,
    /// Twelve-sided die.
    #[serde(rename = "1d12")]
    D12,
    /// Twenty-sided die.
    #[serde(rename = "1d20")]
    D20,
    /// Percentile die (1-100).
    #[serde(rename = "1d100")]
    D100,
    /// Fate die: -1, 0 or +1.
    #[serde(rename = "1dF")]
    Fate,
    /// Coin flip: 0 (tails) or 1 (heads).
    #[serde(rename = "coin")]
    Coin,
}

impl DiceCommand {
    /// The inclusive range of values this command can draw.
    pub fn faces(self) -> RangeInclusive<i32> {
        match self {
            Self::D4 => 1..=4,
            Self::D6 => 1..=6,
            Self::D8 => 1..=8,
            Self::D10 => 1..=10,
            Self::D12 => 1..=12,
            Self::D20 => 1..=20,
            Self::D100 => 1..=100,
            Self::Fate => -1..=1,
            Self::Coin => 0..=1,
        }
    }

    /// The command's name as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::D4 => "1d4",
            Self::D6 => "1d6",
            Self::D8 => "1d8",
            Self::D10 => "1d10",
            Self::D12 => "1d12",
            Self::D20 => "1d20",
            Self::D100 => "1d100",
            Self::Fate => "1dF",
            Self::Coin => "coin",
        }
    }

    /// Draw a value uniformly from this command's face range.
    pub fn draw<R: Rng>(self, rng: &mut R) -> i32 {
        rng.random_range(self.faces())
    }
}

impl std::fmt::Display for DiceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a registered command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandSetId {
    /// One d4.
    #[serde(rename = "1d4")]
    D4,
    /// One d6.
    #[serde(rename = "1d6")]
    D6,
    /// One d8.
    #[serde(rename = "1d8")]
    D8,
    /// One d10.
    #[serde(rename = "1d10")]
    D10,
    /// One d12.
    #[serde(rename = "1d12")]
    D12,
    /// One d20.
    #[serde(rename = "1d20")]
    D20,
    /// One percentile die.
    #[serde(rename = "1d100")]
    D100,
    /// Two d6, as used by PbtA-style moves.
    #[serde(rename = "2d6")]
    TwoD6,
    /// One Fate die.
    #[serde(rename = "1dF")]
    Fate,
    /// The standard Fate roll of four Fate dice.
    #[serde(rename = "4dF")]
    FourFate,
    /// A single coin.
    #[serde(rename = "coin")]
    Coin,
}

impl CommandSetId {
    /// Every registered command set, in display order.
    pub const ALL: [Self; 11] = [
        Self::FourFate,
        Self::Fate,
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
        Self::D100,
        Self::TwoD6,
        Self::Coin,
    ];

    /// The id as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::D4 => "1d4",
            Self::D6 => "1d6",
            Self::D8 => "1d8",
            Self::D10 => "1d10",
            Self::D12 => "1d12",
            Self::D20 => "1d20",
            Self::D100 => "1d100",
            Self::TwoD6 => "2d6",
            Self::Fate => "1dF",
            Self::FourFate => "4dF",
            Self::Coin => "coin",
        }
    }

    /// The commands drawn when this set is rolled, in draw order.
    pub fn commands(self) -> &'static [DiceCommand] {
        match self {
            Self::D4 => &[DiceCommand::D4],
            Self::D6 => &[DiceCommand::D6],
            Self::D8 => &[DiceCommand::D8],
            Self::D10 => &[DiceCommand::D10],
            Self::D12 => &[DiceCommand::D12],
            Self::D20 => &[DiceCommand::D20],
            Self::D100 => &[DiceCommand::D100],
            Self::TwoD6 => &[DiceCommand::D6, DiceCommand::D6],
            Self::Fate => &[DiceCommand::Fate],
            Self::FourFate => &[DiceCommand::Fate; 4],
            Self::Coin => &[DiceCommand::Coin],
        }
    }

    /// Compact label for `count` consecutive copies of this set.
    ///
    /// Dice sets multiply their leading count (`3 × 1d6` is `3d6`,
    /// `2 × 4dF` is `8dF`); coins are written as `3×coin`.
    pub fn repeated_label(self, count: usize) -> String {
        if count <= 1 {
            return self.as_str().to_string();
        }
        let label = self.as_str();
        match label.split_once('d') {
            Some((n, shape)) => {
                let n: usize = n.parse().unwrap_or(1);
                format!("{}d{shape}", n * count)
            }
            None => format!("{count}×{label}"),
        }
    }
}

impl FromStr for CommandSetId {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DiceError::UnknownCommandSet(s.to_string()))
    }
}

impl std::fmt::Display for CommandSetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
