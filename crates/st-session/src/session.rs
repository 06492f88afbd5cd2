//! The replicated session value.
//!
//! A [`Session`] is what peers exchange as a snapshot. It holds one GM
//! (owning the NPC list), the player map keyed by peer id, the confetti
//! counters, the pause flag, and an opaque drawing document.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::member::{MemberId, SessionMember};

/// The GM entry: a regular member plus the NPCs it controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMaster {
    /// The GM's own member record.
    #[serde(flatten)]
    pub member: SessionMember,
    /// GM-controlled characters, in insertion order. NPCs never nest.
    #[serde(default)]
    pub npcs: Vec<SessionMember>,
}

/// Opaque reference to the shared drawing document.
///
/// Stored and forwarded verbatim; its contents are never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawDoc(pub Value);

/// The canonical session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The single GM entry.
    pub gm: GameMaster,
    /// Connected players, keyed by peer connection id.
    #[serde(default)]
    pub players: BTreeMap<MemberId, SessionMember>,
    /// Count of "good" confetti bursts fired.
    #[serde(default)]
    pub good_confetti: u32,
    /// Count of "bad" confetti bursts fired.
    #[serde(default)]
    pub bad_confetti: u32,
    /// Whether the session is paused.
    #[serde(default)]
    pub paused: bool,
    /// The shared drawing document, if one is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tl_draw_doc: Option<DrawDoc>,
}

impl Session {
    /// A fresh session hosted by `gm_id`.
    pub fn new(gm_id: MemberId, default_points: &str) -> Self {
        Self {
            gm: GameMaster {
                member: SessionMember::game_master(gm_id, default_points),
                npcs: Vec::new(),
            },
            players: BTreeMap::new(),
            good_confetti: 0,
            bad_confetti: 0,
            paused: false,
            tl_draw_doc: None,
        }
    }

    /// Members the GM plays: the GM itself followed by its NPCs.
    pub fn controllable_members(&self) -> impl Iterator<Item = &SessionMember> {
        std::iter::once(&self.gm.member).chain(self.gm.npcs.iter())
    }

    /// Every member: GM, NPCs, then players.
    pub fn members(&self) -> impl Iterator<Item = &SessionMember> {
        self.controllable_members().chain(self.players.values())
    }

    /// Look up a member anywhere in the roster.
    pub fn find_member(&self, id: &MemberId) -> Option<&SessionMember> {
        self.members().find(|m| &m.id == id)
    }

    pub(crate) fn find_member_mut(&mut self, id: &MemberId) -> Option<&mut SessionMember> {
        if &self.gm.member.id == id {
            return Some(&mut self.gm.member);
        }
        if let Some(npc) = self.gm.npcs.iter_mut().find(|m| &m.id == id) {
            return Some(npc);
        }
        self.players.get_mut(id)
    }

    pub(crate) fn for_each_member_mut(&mut self, mut f: impl FnMut(&mut SessionMember)) {
        f(&mut self.gm.member);
        self.gm.npcs.iter_mut().for_each(&mut f);
        self.players.values_mut().for_each(&mut f);
    }

    /// Remove an NPC or player. The GM itself is never removed.
    pub(crate) fn remove_member(&mut self, id: &MemberId) -> Option<SessionMember> {
        if let Some(index) = self.gm.npcs.iter().position(|m| &m.id == id) {
            return Some(self.gm.npcs.remove(index));
        }
        self.players.remove(id)
    }

    /// True when `id` is used by any member.
    pub fn contains_member(&self, id: &MemberId) -> bool {
        self.find_member(id).is_some()
    }

    /// Default name for the next NPC: `Character #<count + 1>`.
    pub fn next_npc_name(&self) -> String {
        format!("Character #{}", self.gm.npcs.len() + 1)
    }

    /// Structural problems in this value, if any.
    ///
    /// Covers the single-GM rule, flat NPCs, and id uniqueness. Snapshots
    /// from peers are applied as-is; this is used to log what arrived.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.gm.member.is_gm {
            problems.push("gm entry is not flagged isGM".to_string());
        }
        for m in self.gm.npcs.iter().chain(self.players.values()) {
            if m.is_gm {
                problems.push(format!("member {} is flagged isGM", m.id));
            }
        }
        for (key, player) in &self.players {
            if key != &player.id {
                problems.push(format!("player key {key} holds member {}", player.id));
            }
        }
        let mut seen = HashSet::new();
        for m in self.members() {
            if !seen.insert(&m.id) {
                problems.push(format!("duplicate member id {}", m.id));
            }
        }
        problems
    }
}
