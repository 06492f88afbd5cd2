//! Resolved roll records and aggregation.
//!
//! These records are what gets replicated: once a roll is resolved every
//! value is fixed, and totals are derived from the stored values only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommandSetId, DiceCommand};

/// The value drawn for a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// The command that was drawn.
    pub command: DiceCommand,
    /// The value drawn, within `command.faces()`.
    pub value: i32,
}

/// The values drawn for one command set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSetResult {
    /// Which command set was rolled.
    pub id: CommandSetId,
    /// One result per command, in draw order.
    pub commands: Vec<CommandResult>,
}

impl CommandSetResult {
    /// Sum of the drawn values, saturating at the `i32` bounds.
    pub fn total(&self) -> i32 {
        self.commands
            .iter()
            .fold(0i32, |acc, c| acc.saturating_add(c.value))
    }

    /// The commands sorted by descending value, as shown in listed mode.
    pub fn sorted_desc(&self) -> Vec<CommandResult> {
        let mut sorted = self.commands.clone();
        sorted.sort_by(|a, b| b.value.cmp(&a.value));
        sorted
    }
}

/// A resolved roll group: command sets plus optional modifier and label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollGroupResult {
    /// Label shown next to the result (e.g. a skill name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Flat modifier added to the group's total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<i32>,
    /// Resolved command sets, in request order.
    pub command_sets: Vec<CommandSetResult>,
}

impl RollGroupResult {
    /// Sum of every drawn value, modifier excluded.
    pub fn total_without_modifier(&self) -> i32 {
        self.command_sets
            .iter()
            .fold(0i32, |acc, s| acc.saturating_add(s.total()))
    }

    /// Sum of every drawn value plus the modifier.
    pub fn total(&self) -> i32 {
        self.total_without_modifier()
            .saturating_add(self.modifier.unwrap_or(0))
    }
}

/// Presentation options attached to a roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOptions {
    /// Keep values discrete and sorted instead of summing them.
    #[serde(default)]
    pub list_results: bool,
}

impl RollOptions {
    /// Options for a listed ("roll and list") result.
    pub fn listed() -> Self {
        Self { list_results: true }
    }
}

/// A completed roll, ready to be appended to a member's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    /// Resolved roll groups, in request order.
    pub roll_groups: Vec<RollGroupResult>,
    /// Presentation options the roll was requested with.
    #[serde(default)]
    pub options: RollOptions,
    /// When the roll was resolved.
    pub rolled_at: DateTime<Utc>,
}

impl RollResult {
    /// Every drawn command across all groups, in draw order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandResult> {
        self.roll_groups
            .iter()
            .flat_map(|g| g.command_sets.iter())
            .flat_map(|s| s.commands.iter())
    }

    /// Number of drawn commands.
    pub fn command_count(&self) -> usize {
        self.commands().count()
    }

    /// True when nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }

    /// Sum of all drawn values plus every group modifier.
    ///
    /// Totals saturate rather than overflow, so an extreme modifier in a
    /// received roll still renders.
    pub fn total(&self) -> i32 {
        self.roll_groups
            .iter()
            .fold(0i32, |acc, g| acc.saturating_add(g.total()))
    }

    /// Sum of all drawn values, modifiers excluded.
    pub fn total_without_modifiers(&self) -> i32 {
        self.roll_groups
            .iter()
            .fold(0i32, |acc, g| acc.saturating_add(g.total_without_modifier()))
    }

    /// Cumulative totals in draw order; each group's modifier is one step
    /// after its last command. The final element equals [`Self::total`].
    pub fn running_totals(&self) -> Vec<i32> {
        let mut acc: i32 = 0;
        let mut steps = Vec::new();
        for group in &self.roll_groups {
            for set in &group.command_sets {
                for command in &set.commands {
                    acc = acc.saturating_add(command.value);
                    steps.push(acc);
                }
            }
            if let Some(modifier) = group.modifier {
                acc = acc.saturating_add(modifier);
                steps.push(acc);
            }
        }
        steps
    }

    /// The highest drawn value, if anything was drawn.
    pub fn highest(&self) -> Option<i32> {
        self.commands().map(|c| c.value).max()
    }

    /// The lowest drawn value, if anything was drawn.
    pub fn lowest(&self) -> Option<i32> {
        self.commands().map(|c| c.value).min()
    }
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.options.list_results {
            f.write_str(&crate::format::format_listed(self))
        } else {
            f.write_str(&crate::format::format_summed(self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(id: CommandSetId, values: &[i32]) -> CommandSetResult {
        let commands = id.commands();
        CommandSetResult {
            id,
            commands: values
                .iter()
                .enumerate()
                .map(|(i, &value)| CommandResult {
                    command: commands[i % commands.len()],
                    value,
                })
                .collect(),
        }
    }

    fn make_result(groups: Vec<RollGroupResult>) -> RollResult {
        RollResult {
            roll_groups: groups,
            options: RollOptions::default(),
            rolled_at: Utc::now(),
        }
    }

    #[test]
    fn total_includes_modifiers() {
        let r = make_result(vec![
            RollGroupResult {
                label: None,
                modifier: Some(2),
                command_sets: vec![set(CommandSetId::D20, &[15])],
            },
            RollGroupResult {
                label: None,
                modifier: None,
                command_sets: vec![set(CommandSetId::D6, &[4])],
            },
        ]);
        assert_eq!(r.total(), 21);
        assert_eq!(r.total_without_modifiers(), 19);
    }

    #[test]
    fn fate_values_can_be_negative() {
        let r = make_result(vec![RollGroupResult {
            label: Some("Fight".to_string()),
            modifier: Some(3),
            command_sets: vec![set(CommandSetId::FourFate, &[-1, -1, 0, -1])],
        }]);
        assert_eq!(r.total_without_modifiers(), -3);
        assert_eq!(r.total(), 0);
        assert_eq!(r.lowest(), Some(-1));
        assert_eq!(r.highest(), Some(0));
    }

    #[test]
    fn running_totals_follow_draw_order() {
        let r = make_result(vec![RollGroupResult {
            label: None,
            modifier: Some(1),
            command_sets: vec![
                set(CommandSetId::D6, &[4]),
                set(CommandSetId::D6, &[2]),
                set(CommandSetId::D6, &[5]),
            ],
        }]);
        assert_eq!(r.running_totals(), vec![4, 6, 11, 12]);
        assert_eq!(r.running_totals().last().copied(), Some(r.total()));
    }

    #[test]
    fn empty_result() {
        let r = make_result(Vec::new());
        assert!(r.is_empty());
        assert_eq!(r.total(), 0);
        assert_eq!(r.highest(), None);
        assert!(r.running_totals().is_empty());
    }

    #[test]
    fn extreme_modifiers_saturate() {
        let r = make_result(vec![
            RollGroupResult {
                label: None,
                modifier: Some(i32::MAX),
                command_sets: vec![set(CommandSetId::D20, &[5])],
            },
            RollGroupResult {
                label: None,
                modifier: Some(i32::MAX),
                command_sets: vec![],
            },
        ]);
        assert_eq!(r.roll_groups[0].total(), i32::MAX);
        assert_eq!(r.total(), i32::MAX);
        assert_eq!(r.total_without_modifiers(), 5);
        assert_eq!(r.running_totals(), vec![5, i32::MAX, i32::MAX]);

        let low = make_result(vec![RollGroupResult {
            label: None,
            modifier: Some(i32::MIN),
            command_sets: vec![set(CommandSetId::Fate, &[-1])],
        }]);
        assert_eq!(low.total(), i32::MIN);
    }

    #[test]
    fn sorted_desc() {
        let s = set(CommandSetId::FourFate, &[0, 1, -1, 1]);
        let values: Vec<i32> = s.sorted_desc().iter().map(|c| c.value).collect();
        assert_eq!(values, vec![1, 1, 0, -1]);
        // The stored order is untouched.
        assert_eq!(s.commands[0].value, 0);
    }

    #[test]
    fn serde_uses_camel_case() {
        let r = make_result(vec![RollGroupResult {
            label: None,
            modifier: None,
            command_sets: vec![set(CommandSetId::D6, &[3])],
        }]);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("rollGroups").is_some());
        assert!(json.get("rolledAt").is_some());
        assert_eq!(json["options"]["listResults"], false);
        let back: RollResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
