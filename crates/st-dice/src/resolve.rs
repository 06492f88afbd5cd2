//! Roll requests and their resolution.
//!
//! Resolution validates every command-set id before any value is drawn,
//! so an unknown id never consumes randomness or produces a partial roll.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dice::{
    CommandResult, CommandSetId, CommandSetResult, DiceCommand, RollGroupResult, RollOptions,
    RollResult,
};
use crate::error::{DiceError, DiceResult};

/// One roll group in a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollGroup {
    /// Command-set ids to roll, in order (e.g. `["1d20", "1d6"]`).
    pub command_sets: Vec<String>,
    /// Flat modifier added to the group's total.
    #[serde(default)]
    pub modifier: Option<i32>,
    /// Optional label shown with the result.
    #[serde(default)]
    pub label: Option<String>,
}

impl RollGroup {
    /// Create a roll group from command-set ids.
    pub fn new<I, S>(command_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command_sets: command_sets.into_iter().map(Into::into).collect(),
            modifier: None,
            label: None,
        }
    }

    /// Set the modifier.
    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Resolve a request, drawing every value from `rng`.
pub fn roll<R: Rng>(
    groups: &[RollGroup],
    options: RollOptions,
    rng: &mut R,
) -> DiceResult<RollResult> {
    roll_with(groups, options, |command| command.draw(rng))
}

/// Resolve a request, drawing every value from the `draw` face source.
///
/// `draw` is called once per command, in request order. Values outside
/// the command's face range are rejected.
pub fn roll_with<F>(groups: &[RollGroup], options: RollOptions, mut draw: F) -> DiceResult<RollResult>
where
    F: FnMut(DiceCommand) -> i32,
{
    let parsed = groups
        .iter()
        .map(parse_group)
        .collect::<DiceResult<Vec<_>>>()
        .inspect_err(|e| warn!(error = %e, "rejected roll request"))?;

    let mut roll_groups = Vec::with_capacity(groups.len());
    for (group, ids) in groups.iter().zip(parsed) {
        let mut command_sets = Vec::with_capacity(ids.len());
        for id in ids {
            let mut commands = Vec::with_capacity(id.commands().len());
            for &command in id.commands() {
                let value = draw(command);
                if !command.faces().contains(&value) {
                    return Err(DiceError::FaceOutOfRange { command, value });
                }
                commands.push(CommandResult { command, value });
            }
            command_sets.push(CommandSetResult { id, commands });
        }
        roll_groups.push(RollGroupResult {
            label: group.label.clone(),
            modifier: group.modifier,
            command_sets,
        });
    }

    let result = RollResult {
        roll_groups,
        options,
        rolled_at: Utc::now(),
    };
    debug!(
        groups = result.roll_groups.len(),
        dice = result.command_count(),
        total = result.total(),
        "resolved roll"
    );
    Ok(result)
}

fn parse_group(group: &RollGroup) -> DiceResult<Vec<CommandSetId>> {
    group.command_sets.iter().map(|id| id.parse()).collect()
}
