//! Messages exchanged between peers.
//!
//! The GM broadcasts full snapshots; players send actions to the GM. The
//! snapshot body is carried as a raw JSON value so that a degenerate body
//! reaches the engine's reconciliation guard instead of failing the whole
//! message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use st_dice::RollResult;

use crate::error::SessionResult;
use crate::member::CharacterRef;
use crate::session::Session;

/// A message on the peer channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PeerMessage {
    /// Full session state from the GM.
    Snapshot {
        /// Monotonic per-GM counter, one step per broadcast.
        revision: u64,
        /// The serialized session.
        session: Value,
    },
    /// A change requested by a player, applied by the GM.
    Action {
        /// The requested change.
        action: PlayerAction,
    },
}

/// A change a player asks the GM to apply to their own member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlayerAction {
    /// Record a roll the player already resolved.
    Roll {
        /// The resolved roll.
        result: RollResult,
    },
    /// Change the player's display name.
    SetName {
        /// New name.
        name: String,
    },
    /// Change the player's points.
    SetPoints {
        /// New points value.
        points: String,
    },
    /// Mark whether the player acted this turn.
    SetPlayedDuringTurn {
        /// New flag value.
        played: bool,
    },
    /// Attach or detach a character sheet.
    SetCharacter {
        /// The character, or `None` to detach.
        character: Option<CharacterRef>,
    },
}

impl PeerMessage {
    /// Build a snapshot message from a session.
    pub fn snapshot(revision: u64, session: &Session) -> SessionResult<Self> {
        Ok(Self::Snapshot {
            revision,
            session: serde_json::to_value(session)?,
        })
    }

    /// Encode for the wire.
    pub fn to_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the wire.
    pub fn from_json(text: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<PlayerAction> for PeerMessage {
    fn from(action: PlayerAction) -> Self {
        Self::Action { action }
    }
}
