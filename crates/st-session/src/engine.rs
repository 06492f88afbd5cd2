//! The session engine: sole owner and mutator of the canonical session.
//!
//! Every mutation runs to completion synchronously, then notifies
//! subscribers with the new value. Broadcasting is left to the caller,
//! which hands the resulting snapshot to its transport.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::{debug, info, warn};

use st_dice::{RollGroup, RollOptions, RollResult};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::member::{CharacterRef, MemberId, SessionMember};
use crate::session::{DrawDoc, Session};

/// Local roll state. Not part of the replicated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollPhase {
    /// No roll in progress.
    Idle,
    /// A roll is being resolved.
    Rolling,
}

/// Handle returned by [`SessionEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of a reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The payload replaced the canonical session.
    Applied,
    /// The payload was degenerate; the session is unchanged.
    Ignored,
}

type Listener = Box<dyn FnMut(&Session)>;

/// Owns the canonical [`Session`] of one participant.
pub struct SessionEngine {
    session: Session,
    default_points: String,
    rng: StdRng,
    roll_phase: RollPhase,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl SessionEngine {
    /// Create an engine seeded with a fresh GM keyed by `config.user_id`.
    pub fn new(config: &SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            session: Session::new(MemberId::from(config.user_id.as_str()), &config.default_points),
            default_points: config.default_points.clone(),
            rng,
            roll_phase: RollPhase::Idle,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The canonical session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// An owned copy of the session, e.g. for a broadcast.
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    /// The GM member's id.
    pub fn gm_id(&self) -> &MemberId {
        &self.session.gm.member.id
    }

    /// Whether a roll is being resolved.
    pub fn roll_phase(&self) -> RollPhase {
        self.roll_phase
    }

    /// Register a listener called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Session) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns true if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let len_before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() < len_before
    }

    /// Append a new NPC named `Character #<n>` and return its id.
    pub fn add_npc(&mut self) -> MemberId {
        let id = MemberId::generate();
        let name = self.session.next_npc_name();
        debug!(member = %id, name = %name, "npc added");
        self.session
            .gm
            .npcs
            .push(SessionMember::new(id.clone(), name, self.default_points.as_str()));
        self.notify();
        id
    }

    /// Create a player slot for a connected peer.
    ///
    /// Returns false, leaving the roster untouched, when the id is already
    /// in use (a reconnecting player keeps their record).
    pub fn add_player(&mut self, id: MemberId, name: impl Into<String>) -> bool {
        if self.session.contains_member(&id) {
            debug!(member = %id, "player already in roster");
            return false;
        }
        let member = SessionMember::new(id.clone(), name, self.default_points.as_str());
        info!(member = %id, name = %member.player_name, "player added");
        self.session.players.insert(id, member);
        self.notify();
        true
    }

    /// Remove an NPC or player. Unknown ids are ignored.
    pub fn remove_player(&mut self, id: &MemberId) -> bool {
        match self.session.remove_member(id) {
            Some(member) => {
                info!(member = %id, name = %member.player_name, "member removed");
                self.notify();
                true
            }
            None => {
                debug!(error = %SessionError::MemberNotFound(id.clone()), "remove ignored");
                false
            }
        }
    }

    /// Increment the good confetti counter by one, saturating at `u32::MAX`.
    pub fn fire_good_confetti(&mut self) -> &Session {
        self.session.good_confetti = self.session.good_confetti.saturating_add(1);
        debug!(count = self.session.good_confetti, "good confetti");
        self.notify();
        &self.session
    }

    /// Increment the bad confetti counter by one, saturating at `u32::MAX`.
    pub fn fire_bad_confetti(&mut self) -> &Session {
        self.session.bad_confetti = self.session.bad_confetti.saturating_add(1);
        debug!(count = self.session.bad_confetti, "bad confetti");
        self.notify();
        &self.session
    }

    /// Set the pause flag.
    pub fn set_paused(&mut self, paused: bool) -> &Session {
        self.session.paused = paused;
        self.notify();
        &self.session
    }

    /// Attach, replace, or clear the drawing document.
    pub fn set_draw_doc(&mut self, doc: Option<DrawDoc>) -> &Session {
        self.session.tl_draw_doc = doc;
        self.notify();
        &self.session
    }

    /// Rename a member.
    pub fn set_player_name(&mut self, id: &MemberId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.update_member(id, "rename", |m| m.player_name = name)
    }

    /// Set a member's points.
    pub fn set_points(&mut self, id: &MemberId, points: impl Into<String>) -> bool {
        let points = points.into();
        self.update_member(id, "points", |m| m.points = points)
    }

    /// Set a member's turn flag.
    pub fn set_played_during_turn(&mut self, id: &MemberId, played: bool) -> bool {
        self.update_member(id, "played", |m| m.played_during_turn = played)
    }

    /// Set a member's visibility flag.
    pub fn set_private(&mut self, id: &MemberId, private: bool) -> bool {
        self.update_member(id, "private", |m| m.private = private)
    }

    /// Attach or detach a character sheet.
    pub fn set_character(&mut self, id: &MemberId, character: Option<CharacterRef>) -> bool {
        self.update_member(id, "character", |m| m.character = character)
    }

    /// Start a new turn: clear every member's turn flag.
    pub fn reset_played_during_turn(&mut self) -> &Session {
        self.session
            .for_each_member_mut(|m| m.played_during_turn = false);
        debug!("turn reset");
        self.notify();
        &self.session
    }

    /// Resolve a roll with the engine's rng without recording it.
    pub fn resolve(&mut self, groups: &[RollGroup], options: RollOptions) -> SessionResult<RollResult> {
        self.roll_phase = RollPhase::Rolling;
        let result = st_dice::roll(groups, options, &mut self.rng);
        self.roll_phase = RollPhase::Idle;
        result.map_err(SessionError::from)
    }

    /// Resolve a roll and append it to the member's history.
    ///
    /// Unknown command sets fail. An unknown member is tolerated: the roll
    /// is resolved but not recorded, and `None` is returned.
    pub fn roll(
        &mut self,
        id: &MemberId,
        groups: &[RollGroup],
        options: RollOptions,
    ) -> SessionResult<Option<RollResult>> {
        let result = self.resolve(groups, options)?;
        if self.record_roll(id, result.clone()) {
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }

    /// Append an already resolved roll to a member's history.
    pub fn record_roll(&mut self, id: &MemberId, roll: RollResult) -> bool {
        self.update_member(id, "roll", |m| m.push_roll(roll))
    }

    /// Replace the session with a received snapshot.
    ///
    /// `None` is a no-op. Otherwise the payload becomes the canonical value
    /// as given, without merging any of the previous state.
    pub fn override_session(&mut self, payload: Option<Session>) -> Reconciliation {
        let Some(session) = payload else {
            let err = SessionError::MalformedReconciliationPayload("no payload".to_string());
            warn!(error = %err, "reconciliation ignored");
            return Reconciliation::Ignored;
        };
        let problems = session.invariant_violations();
        if !problems.is_empty() {
            warn!(problems = ?problems, "applying snapshot with roster problems");
        }
        self.session = session;
        debug!(
            players = self.session.players.len(),
            npcs = self.session.gm.npcs.len(),
            "session overridden"
        );
        self.notify();
        Reconciliation::Applied
    }

    /// Replace the session with a snapshot received as JSON value.
    pub fn override_session_value(&mut self, payload: Value) -> Reconciliation {
        match decode_snapshot(payload) {
            Ok(session) => self.override_session(Some(session)),
            Err(err) => {
                warn!(error = %err, "reconciliation ignored");
                Reconciliation::Ignored
            }
        }
    }

    /// Replace the session with a snapshot received as JSON text.
    pub fn override_session_json(&mut self, payload: &str) -> Reconciliation {
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => self.override_session_value(value),
            Err(err) => {
                let err = SessionError::MalformedReconciliationPayload(err.to_string());
                warn!(error = %err, "reconciliation ignored");
                Reconciliation::Ignored
            }
        }
    }

    fn update_member(
        &mut self,
        id: &MemberId,
        op: &'static str,
        f: impl FnOnce(&mut SessionMember),
    ) -> bool {
        match self.session.find_member_mut(id) {
            Some(member) => {
                f(member);
                debug!(member = %id, op, "member updated");
                self.notify();
                true
            }
            None => {
                debug!(error = %SessionError::MemberNotFound(id.clone()), op, "update ignored");
                false
            }
        }
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.session);
        }
    }
}

/// Decode a snapshot payload, rejecting anything that is not a session
/// object.
pub fn decode_snapshot(payload: Value) -> SessionResult<Session> {
    let kind = match &payload {
        Value::Object(_) => None,
        Value::Null => Some("null"),
        Value::Bool(_) => Some("a boolean"),
        Value::Number(_) => Some("a number"),
        Value::String(_) => Some("a string"),
        Value::Array(_) => Some("an array"),
    };
    if let Some(kind) = kind {
        return Err(SessionError::MalformedReconciliationPayload(format!(
            "expected an object, got {kind}"
        )));
    }
    serde_json::from_value(payload)
        .map_err(|e| SessionError::MalformedReconciliationPayload(e.to_string()))
}
