//! Editable dice pools attached to character-sheet blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CommandSetId;
use crate::error::DiceResult;
use crate::resolve::RollGroup;

/// Polyhedral dice a uniform pool can step through, smallest first.
pub const DIE_LADDER: [CommandSetId; 7] = [
    CommandSetId::D4,
    CommandSetId::D6,
    CommandSetId::D8,
    CommandSetId::D10,
    CommandSetId::D12,
    CommandSetId::D20,
    CommandSetId::D100,
];

/// A list of command sets rolled together as one roll group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePool {
    /// The command sets in this pool.
    pub commands: Vec<CommandSetId>,
}

impl DicePool {
    /// Create an empty dice pool.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Build a pool from wire ids, rejecting unknown ones.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> DiceResult<Self> {
        let commands = ids
            .iter()
            .map(|id| id.as_ref().parse())
            .collect::<DiceResult<Vec<_>>>()?;
        Ok(Self { commands })
    }

    /// Add `count` copies of a command set.
    pub fn add(mut self, id: CommandSetId, count: u32) -> Self {
        self.commands
            .extend(std::iter::repeat_n(id, count as usize));
        self
    }

    /// Returns how many command sets are in the pool.
    pub fn count(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if the pool has no command sets.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True when every entry is the same command set.
    pub fn is_uniform(&self) -> bool {
        match self.commands.first() {
            Some(first) => self.commands.iter().all(|c| c == first),
            None => false,
        }
    }

    /// True when the pool is uniform and its die sits on [`DIE_LADDER`].
    pub fn can_change_die_size(&self) -> bool {
        self.is_uniform() && self.commands.first().is_some_and(|c| DIE_LADDER.contains(c))
    }

    /// Repeat the first command set once more. Only uniform pools grow.
    pub fn add_one(&mut self) -> bool {
        match self.commands.first().copied() {
            Some(first) if self.is_uniform() => {
                self.commands.push(first);
                true
            }
            _ => false,
        }
    }

    /// Drop one command set, never emptying the pool.
    pub fn remove_one(&mut self) -> bool {
        if self.is_uniform() && self.commands.len() > 1 {
            self.commands.remove(0);
            true
        } else {
            false
        }
    }

    /// Move every die one step up the ladder, stopping at the top.
    pub fn step_up(&mut self) -> bool {
        self.step(1)
    }

    /// Move every die one step down the ladder, stopping at the bottom.
    pub fn step_down(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> bool {
        if !self.can_change_die_size() {
            return false;
        }
        let mut changed = false;
        for command in &mut self.commands {
            let Some(index) = DIE_LADDER.iter().position(|d| d == command) else {
                continue;
            };
            let target = index
                .saturating_add_signed(delta)
                .min(DIE_LADDER.len() - 1);
            if target != index {
                *command = DIE_LADDER[target];
                changed = true;
            }
        }
        changed
    }

    /// How many times each command set appears.
    pub fn counts(&self) -> BTreeMap<CommandSetId, u32> {
        let mut counts = BTreeMap::new();
        for id in &self.commands {
            *counts.entry(*id).or_insert(0) += 1;
        }
        counts
    }

    /// Turn the pool into a roll group request.
    pub fn to_roll_group(&self, label: Option<&str>, modifier: Option<i32>) -> RollGroup {
        RollGroup {
            command_sets: self.commands.iter().map(|c| c.as_str().to_string()).collect(),
            modifier,
            label: label.map(str::to_string),
        }
    }
}
