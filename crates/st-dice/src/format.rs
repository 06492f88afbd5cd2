//! Presentation of resolved rolls.
//!
//! Everything here is a pure function of the stored values, so a result
//! received from a peer renders exactly as it did where it was rolled.

use serde::{Deserialize, Serialize};

use crate::dice::{CommandSetId, DiceCommand, RollResult};

const LIST_SEPARATOR: &str = " • ";

/// What a dice box should show for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayState {
    /// Nothing was drawn; no total is shown.
    Hidden,
    /// Listed mode; values are shown individually and the total is hidden.
    Listed,
    /// Summed mode with the final total.
    Total(i32),
}

impl RollResult {
    /// The display state for this result.
    pub fn display_state(&self) -> DisplayState {
        if self.is_empty() {
            DisplayState::Hidden
        } else if self.options.list_results {
            DisplayState::Listed
        } else {
            DisplayState::Total(self.total())
        }
    }
}

/// Render a single drawn value for display.
pub fn format_detailed_result(command: DiceCommand, value: i32) -> String {
    match command {
        DiceCommand::Fate => match value {
            v if v > 0 => "+".to_string(),
            0 => "0".to_string(),
            _ => "-".to_string(),
        },
        DiceCommand::Coin => {
            if value > 0 {
                "Heads".to_string()
            } else {
                "Tails".to_string()
            }
        }
        _ => value.to_string(),
    }
}

/// Compact display cells for one roll group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedRollGroup {
    /// The group's label.
    pub label: Option<String>,
    /// The group's modifier.
    pub modifier: Option<i32>,
    /// One display cell per (collapsed) command set.
    pub cells: Vec<String>,
}

/// Collapse each group's command sets into display cells.
///
/// In summed mode consecutive identical command sets collapse into one
/// count-and-label cell (`1d6, 1d6, 1d6` becomes `3d6`). In listed mode
/// every command set keeps its own cell. Stored values are untouched.
pub fn simplify_rolls(result: &RollResult) -> Vec<SimplifiedRollGroup> {
    result
        .roll_groups
        .iter()
        .map(|group| {
            let ids: Vec<CommandSetId> = group.command_sets.iter().map(|s| s.id).collect();
            let cells = if result.options.list_results {
                ids.iter().map(|id| id.as_str().to_string()).collect()
            } else {
                collapse_runs(&ids)
            };
            SimplifiedRollGroup {
                label: group.label.clone(),
                modifier: group.modifier,
                cells,
            }
        })
        .collect()
}

fn collapse_runs(ids: &[CommandSetId]) -> Vec<String> {
    let mut cells = Vec::new();
    let mut iter = ids.iter().peekable();
    while let Some(&id) = iter.next() {
        let mut count = 1;
        while iter.next_if(|&&next| next == id).is_some() {
            count += 1;
        }
        cells.push(id.repeated_label(count));
    }
    cells
}

/// Summed rendering: every value in draw order, modifiers last per group,
/// then the total. Empty results render as an empty string.
pub fn format_summed(result: &RollResult) -> String {
    let mut terms = Vec::new();
    for group in &result.roll_groups {
        terms.extend(group.command_sets.iter().flat_map(|s| s.commands.iter().map(|c| c.value)));
        if let Some(modifier) = group.modifier {
            terms.push(modifier);
        }
    }
    if result.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        if i == 0 {
            out.push_str(&term.to_string());
        } else if *term < 0 {
            out.push_str(&format!(" - {}", term.unsigned_abs()));
        } else {
            out.push_str(&format!(" + {term}"));
        }
    }
    out.push_str(&format!(" = {}", result.total()));
    out
}

/// Listed rendering: values sorted descending within each command set,
/// kept discrete, with no total.
pub fn format_listed(result: &RollResult) -> String {
    let mut cells = Vec::new();
    for group in &result.roll_groups {
        for set in &group.command_sets {
            cells.extend(
                set.sorted_desc()
                    .iter()
                    .map(|c| format_detailed_result(c.command, c.value)),
            );
        }
        if let Some(modifier) = group.modifier {
            cells.push(format!("{modifier:+}"));
        }
    }
    cells.join(LIST_SEPARATOR)
}

/// The labels of every labelled group, joined by ` / `, with non-zero
/// modifiers in parentheses.
pub fn format_labels(result: &RollResult) -> String {
    result
        .roll_groups
        .iter()
        .filter_map(|group| {
            let label = group.label.as_deref().filter(|l| !l.is_empty())?;
            Some(match group.modifier {
                Some(m) if m != 0 => format!("{label} ({m})"),
                _ => label.to_string(),
            })
        })
        .collect::<Vec<_>>()
        .join(" / ")
}
