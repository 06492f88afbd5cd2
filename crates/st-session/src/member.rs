//! Roster members: the GM, NPCs, and players share one record type.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use st_dice::RollResult;

/// Display name of the GM member.
pub const GM_NAME: &str = "Game Master";

/// Starting value of a member's points.
pub const DEFAULT_POINTS: &str = "3";

/// Unique identifier of a roster member.
///
/// The GM uses the local participant's id, players use their peer
/// connection id, and NPCs get a generated UUID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    /// Generate a fresh random member ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weak reference to a character sheet owned outside the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    /// Id of the character entity.
    pub id: String,
    /// Character name at the time it was attached.
    #[serde(default)]
    pub name: String,
}

impl CharacterRef {
    /// Create a character reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

fn default_points() -> String {
    DEFAULT_POINTS.to_string()
}

/// A participant slot: the GM, an NPC, or a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMember {
    /// Stable identifier, never reused. Empty when a snapshot omits it.
    #[serde(default)]
    pub id: MemberId,
    /// Display name.
    #[serde(default)]
    pub player_name: String,
    /// Attached character sheet, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<CharacterRef>,
    /// Completed rolls, oldest first. Only ever appended to.
    #[serde(default)]
    pub rolls: Vec<RollResult>,
    /// Whether this member has acted during the current turn.
    #[serde(default)]
    pub played_during_turn: bool,
    /// Presentation-only visibility flag.
    #[serde(default)]
    pub private: bool,
    /// True exactly for the session's GM.
    #[serde(rename = "isGM", default)]
    pub is_gm: bool,
    /// Resource counter (e.g. fate points), kept as free text.
    #[serde(default = "default_points")]
    pub points: String,
}

impl SessionMember {
    /// Create a non-GM member with default points and no rolls.
    pub fn new(id: MemberId, player_name: impl Into<String>, points: impl Into<String>) -> Self {
        Self {
            id,
            player_name: player_name.into(),
            character: None,
            rolls: Vec::new(),
            played_during_turn: false,
            private: false,
            is_gm: false,
            points: points.into(),
        }
    }

    /// Create the GM member.
    pub fn game_master(id: MemberId, points: impl Into<String>) -> Self {
        Self {
            is_gm: true,
            ..Self::new(id, GM_NAME, points)
        }
    }

    /// Append a completed roll.
    pub fn push_roll(&mut self, roll: RollResult) {
        self.rolls.push(roll);
    }

    /// The most recent roll, if any.
    pub fn latest_roll(&self) -> Option<&RollResult> {
        self.rolls.last()
    }
}
