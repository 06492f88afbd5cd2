//! Adapter between the peer connection feed and a session engine.
//!
//! The transport delivers [`PeerEvent`]s; hosts and clients turn them into
//! engine calls and return the [`Outbound`] messages to send. Nothing in
//! here touches the network: the caller hands outbound messages to its
//! [`Transport`].

use tracing::{debug, info, warn};

use st_dice::{RollGroup, RollOptions};

use crate::config::SessionConfig;
use crate::engine::{Reconciliation, SessionEngine};
use crate::error::SessionResult;
use crate::member::{CharacterRef, MemberId};
use crate::protocol::{PeerMessage, PlayerAction};

/// What happened on a peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEventKind {
    /// The peer connected.
    Joined {
        /// Name the peer announced, if any.
        name: Option<String>,
    },
    /// The peer disconnected.
    Left,
    /// The peer sent a message.
    Message(String),
}

/// An event from the peer connection feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEvent {
    /// The remote peer's connection id.
    pub peer_id: MemberId,
    /// What happened.
    pub kind: PeerEventKind,
}

impl PeerEvent {
    /// A join event.
    pub fn joined(peer_id: impl Into<MemberId>, name: Option<&str>) -> Self {
        Self {
            peer_id: peer_id.into(),
            kind: PeerEventKind::Joined {
                name: name.map(str::to_string),
            },
        }
    }

    /// A leave event.
    pub fn left(peer_id: impl Into<MemberId>) -> Self {
        Self {
            peer_id: peer_id.into(),
            kind: PeerEventKind::Left,
        }
    }

    /// A message event.
    pub fn message(peer_id: impl Into<MemberId>, text: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            kind: PeerEventKind::Message(text.into()),
        }
    }
}

/// Where an outbound message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single peer.
    Peer(MemberId),
    /// Every connected peer.
    Broadcast,
}

/// A message to hand to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    /// Recipient(s).
    pub target: Target,
    /// The message.
    pub message: PeerMessage,
}

/// Sends messages to peers. Delivery guarantees are the implementor's.
pub trait Transport {
    /// Send one message.
    fn send(&mut self, outbound: Outbound) -> SessionResult<()>;
}

/// Hand every outbound message to a transport, in order.
pub fn dispatch<T: Transport + ?Sized>(
    transport: &mut T,
    outbound: impl IntoIterator<Item = Outbound>,
) -> SessionResult<()> {
    for message in outbound {
        transport.send(message)?;
    }
    Ok(())
}

/// The GM side: owns the canonical session and rebroadcasts after changes.
pub struct GmHost {
    engine: SessionEngine,
    revision: u64,
}

impl GmHost {
    /// Host a new session.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            engine: SessionEngine::new(config),
            revision: 0,
        }
    }

    /// The canonical engine, for reads and subscriptions.
    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Revision of the last broadcast snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Run a local GM action and produce the broadcast that follows it.
    pub fn apply<T>(
        &mut self,
        action: impl FnOnce(&mut SessionEngine) -> T,
    ) -> SessionResult<(T, Outbound)> {
        let value = action(&mut self.engine);
        let outbound = self.broadcast()?;
        Ok((value, outbound))
    }

    /// Build the next snapshot broadcast.
    pub fn broadcast(&mut self) -> SessionResult<Outbound> {
        self.revision += 1;
        Ok(Outbound {
            target: Target::Broadcast,
            message: PeerMessage::snapshot(self.revision, self.engine.session())?,
        })
    }

    /// Apply one feed event and return what to send.
    ///
    /// Malformed messages and actions from unknown peers are logged and
    /// dropped; they never change the session.
    pub fn handle_event(&mut self, event: PeerEvent) -> SessionResult<Vec<Outbound>> {
        let changed = match event.kind {
            PeerEventKind::Joined { name } => {
                let name = name.unwrap_or_else(|| {
                    format!("Player #{}", self.engine.session().players.len() + 1)
                });
                info!(peer = %event.peer_id, "peer joined");
                // A reconnecting player still needs the current state.
                self.engine.add_player(event.peer_id.clone(), name);
                true
            }
            PeerEventKind::Left => {
                info!(peer = %event.peer_id, "peer left");
                self.engine.remove_player(&event.peer_id)
            }
            PeerEventKind::Message(text) => self.handle_message(&event.peer_id, &text),
        };
        if changed {
            Ok(vec![self.broadcast()?])
        } else {
            Ok(Vec::new())
        }
    }

    fn handle_message(&mut self, peer: &MemberId, text: &str) -> bool {
        let message = match PeerMessage::from_json(text) {
            Ok(message) => message,
            Err(err) => {
                warn!(peer = %peer, error = %err, "dropping malformed message");
                return false;
            }
        };
        let action = match message {
            PeerMessage::Action { action } => action,
            PeerMessage::Snapshot { .. } => {
                warn!(peer = %peer, "ignoring snapshot sent to the GM");
                return false;
            }
        };
        if !self.engine.session().players.contains_key(peer) {
            warn!(peer = %peer, "ignoring action from a peer without a player slot");
            return false;
        }
        debug!(peer = %peer, action = ?action, "applying player action");
        match action {
            PlayerAction::Roll { result } => {
                if let Some(bad) = result
                    .commands()
                    .find(|c| !c.command.faces().contains(&c.value))
                {
                    warn!(
                        peer = %peer,
                        command = %bad.command,
                        value = bad.value,
                        "dropping roll with impossible face"
                    );
                    return false;
                }
                self.engine.record_roll(peer, result)
            }
            PlayerAction::SetName { name } => self.engine.set_player_name(peer, name),
            PlayerAction::SetPoints { points } => self.engine.set_points(peer, points),
            PlayerAction::SetPlayedDuringTurn { played } => {
                self.engine.set_played_during_turn(peer, played)
            }
            PlayerAction::SetCharacter { character } => {
                self.engine.set_character(peer, character)
            }
        }
    }
}

/// The player side: a downstream copy of the GM's session.
pub struct PlayerClient {
    engine: SessionEngine,
    gm_peer: MemberId,
    reject_stale: bool,
    last_revision: Option<u64>,
}

impl PlayerClient {
    /// Connect to the GM reachable as `gm_peer`.
    pub fn new(config: &SessionConfig, gm_peer: impl Into<MemberId>) -> Self {
        Self {
            engine: SessionEngine::new(config),
            gm_peer: gm_peer.into(),
            reject_stale: config.reject_stale_snapshots,
            last_revision: None,
        }
    }

    /// The local engine holding the last applied snapshot.
    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Mutable access, e.g. to subscribe.
    pub fn engine_mut(&mut self) -> &mut SessionEngine {
        &mut self.engine
    }

    /// Revision of the last applied snapshot.
    pub fn last_revision(&self) -> Option<u64> {
        self.last_revision
    }

    /// Apply one feed event. Only snapshots from the GM change state.
    pub fn handle_event(&mut self, event: PeerEvent) -> Reconciliation {
        let text = match event.kind {
            PeerEventKind::Message(text) if event.peer_id == self.gm_peer => text,
            PeerEventKind::Left if event.peer_id == self.gm_peer => {
                info!(gm = %self.gm_peer, "gm disconnected");
                return Reconciliation::Ignored;
            }
            _ => return Reconciliation::Ignored,
        };
        let (revision, session) = match PeerMessage::from_json(&text) {
            Ok(PeerMessage::Snapshot { revision, session }) => (revision, session),
            Ok(PeerMessage::Action { .. }) => {
                warn!("ignoring action sent to a player");
                return Reconciliation::Ignored;
            }
            Err(err) => {
                warn!(error = %err, "dropping malformed message");
                return Reconciliation::Ignored;
            }
        };
        if self.reject_stale && self.last_revision.is_some_and(|last| revision <= last) {
            debug!(revision, last = ?self.last_revision, "ignoring stale snapshot");
            return Reconciliation::Ignored;
        }
        let outcome = self.engine.override_session_value(session);
        if outcome == Reconciliation::Applied {
            self.last_revision = Some(revision);
        }
        outcome
    }

    /// Resolve a roll locally and produce the action that records it.
    pub fn roll(&mut self, groups: &[RollGroup], options: RollOptions) -> SessionResult<Outbound> {
        let result = self.engine.resolve(groups, options)?;
        Ok(self.send(PlayerAction::Roll { result }))
    }

    /// Ask the GM to rename this player.
    pub fn set_name(&self, name: impl Into<String>) -> Outbound {
        self.send(PlayerAction::SetName { name: name.into() })
    }

    /// Ask the GM to change this player's points.
    pub fn set_points(&self, points: impl Into<String>) -> Outbound {
        self.send(PlayerAction::SetPoints {
            points: points.into(),
        })
    }

    /// Ask the GM to set this player's turn flag.
    pub fn set_played_during_turn(&self, played: bool) -> Outbound {
        self.send(PlayerAction::SetPlayedDuringTurn { played })
    }

    /// Ask the GM to attach or detach a character.
    pub fn set_character(&self, character: Option<CharacterRef>) -> Outbound {
        self.send(PlayerAction::SetCharacter { character })
    }

    fn send(&self, action: PlayerAction) -> Outbound {
        Outbound {
            target: Target::Peer(self.gm_peer.clone()),
            message: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> GmHost {
        GmHost::new(&SessionConfig::for_user("gm").with_seed(1))
    }

    fn player(id: &str) -> PlayerClient {
        PlayerClient::new(&SessionConfig::for_user(id).with_seed(2), "gm")
    }

    fn text(outbound: &Outbound) -> String {
        outbound.message.to_json().unwrap()
    }

    #[test]
    fn join_adds_player_and_broadcasts() {
        let mut gm = host();
        let out = gm.handle_event(PeerEvent::joined("p1", Some("Ada"))).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, Target::Broadcast);
        assert!(matches!(out[0].message, PeerMessage::Snapshot { revision: 1, .. }));
        assert_eq!(
            gm.engine().session().players[&MemberId::from("p1")].player_name,
            "Ada"
        );
    }

    #[test]
    fn unnamed_join_gets_default_name() {
        let mut gm = host();
        gm.handle_event(PeerEvent::joined("p1", None)).unwrap();
        gm.handle_event(PeerEvent::joined("p2", None)).unwrap();
        let names: Vec<&str> = gm
            .engine()
            .session()
            .players
            .values()
            .map(|p| p.player_name.as_str())
            .collect();
        assert_eq!(names, vec!["Player #1", "Player #2"]);
    }

    #[test]
    fn leave_removes_player() {
        let mut gm = host();
        gm.handle_event(PeerEvent::joined("p1", Some("Ada"))).unwrap();
        let out = gm.handle_event(PeerEvent::left("p1")).unwrap();
        assert_eq!(out.len(), 1);
        assert!(gm.engine().session().players.is_empty());
        // Leaving twice is tolerated and sends nothing.
        assert!(gm.handle_event(PeerEvent::left("p1")).unwrap().is_empty());
    }

    #[test]
    fn player_roll_is_recorded_by_gm() {
        let mut gm = host();
        gm.handle_event(PeerEvent::joined("p1", Some("Ada"))).unwrap();
        let mut ada = player("p1");

        let out = ada
            .roll(&[RollGroup::new(["4dF"])], RollOptions::default())
            .unwrap();
        assert_eq!(out.target, Target::Peer("gm".into()));
        let resolved = match &out.message {
            PeerMessage::Action {
                action: PlayerAction::Roll { result },
            } => result.clone(),
            other => panic!("unexpected message {other:?}"),
        };
        // The player's local copy is only updated by snapshots.
        assert!(ada.engine().session().players.is_empty());

        let broadcast = gm.handle_event(PeerEvent::message("p1", text(&out))).unwrap();
        assert_eq!(
            gm.engine().session().players[&MemberId::from("p1")].rolls,
            vec![resolved.clone()]
        );

        ada.handle_event(PeerEvent::message("gm", text(&broadcast[0])));
        assert_eq!(ada.engine().session(), gm.engine().session());
        assert_eq!(
            ada.engine().session().players[&MemberId::from("p1")].rolls[0].total(),
            resolved.total()
        );
    }

    #[test]
    fn impossible_faces_are_not_recorded() {
        let mut gm = host();
        gm.handle_event(PeerEvent::joined("p1", Some("Ada"))).unwrap();
        let mut result = st_dice::roll_with(
            &[RollGroup::new(["1d6"])],
            RollOptions::default(),
            |_| 4,
        )
        .unwrap();
        result.roll_groups[0].command_sets[0].commands[0].value = 99;
        let forged: PeerMessage = PlayerAction::Roll { result }.into();

        let out = gm
            .handle_event(PeerEvent::message("p1", forged.to_json().unwrap()))
            .unwrap();
        assert!(out.is_empty());
        assert!(gm.engine().session().players[&MemberId::from("p1")].rolls.is_empty());
    }

    #[test]
    fn actions_from_unknown_peers_are_dropped() {
        let mut gm = host();
        let stranger = player("p9");
        let out = stranger.set_points("99");
        assert!(gm.handle_event(PeerEvent::message("p9", text(&out))).unwrap().is_empty());
        assert!(gm.handle_event(PeerEvent::message("p9", "garbage")).unwrap().is_empty());
        assert_eq!(gm.revision(), 0);
    }

    #[test]
    fn player_actions_update_own_member() {
        let mut gm = host();
        gm.handle_event(PeerEvent::joined("p1", None)).unwrap();
        let ada = player("p1");
        for out in [
            ada.set_name("Ada"),
            ada.set_points("1"),
            ada.set_played_during_turn(true),
            ada.set_character(Some(CharacterRef::new("c7", "Zird"))),
        ] {
            assert_eq!(gm.handle_event(PeerEvent::message("p1", text(&out))).unwrap().len(), 1);
        }
        let me = &gm.engine().session().players[&MemberId::from("p1")];
        assert_eq!(me.player_name, "Ada");
        assert_eq!(me.points, "1");
        assert!(me.played_during_turn);
        assert_eq!(me.character.as_ref().unwrap().name, "Zird");
        assert_eq!(gm.revision(), 5);
    }

    #[test]
    fn gm_local_actions_broadcast() {
        let mut gm = host();
        let (npc, out) = gm.apply(|e| e.add_npc()).unwrap();
        assert_eq!(out.target, Target::Broadcast);
        assert_eq!(gm.engine().session().gm.npcs[0].id, npc);
        let (_, out) = gm.apply(|e| {
            e.fire_good_confetti();
        })
        .unwrap();
        assert!(matches!(out.message, PeerMessage::Snapshot { revision: 2, .. }));
    }

    #[test]
    fn player_ignores_non_gm_and_malformed_input() {
        let mut ada = player("p1");
        let before = serde_json::to_string(ada.engine().session()).unwrap();
        let gm = host();
        let snapshot = PeerMessage::snapshot(1, gm.engine().session()).unwrap();
        let snapshot = snapshot.to_json().unwrap();

        assert_eq!(ada.handle_event(PeerEvent::message("p2", snapshot)), Reconciliation::Ignored);
        assert_eq!(ada.handle_event(PeerEvent::message("gm", "nope")), Reconciliation::Ignored);
        assert_eq!(
            ada.handle_event(PeerEvent::message(
                "gm",
                r#"{"type":"snapshot","revision":1,"session":null}"#
            )),
            Reconciliation::Ignored
        );
        assert_eq!(ada.handle_event(PeerEvent::left("gm")), Reconciliation::Ignored);
        assert_eq!(serde_json::to_string(ada.engine().session()).unwrap(), before);
        assert_eq!(ada.last_revision(), None);
    }

    #[test]
    fn last_write_wins_by_default() {
        let mut gm = host();
        let old = gm.broadcast().unwrap();
        gm.apply(|e| e.fire_bad_confetti().bad_confetti).unwrap();
        let new = gm.broadcast().unwrap();

        let mut ada = player("p1");
        ada.handle_event(PeerEvent::message("gm", text(&new)));
        assert_eq!(ada.handle_event(PeerEvent::message("gm", text(&old))), Reconciliation::Applied);
        assert_eq!(ada.engine().session().bad_confetti, 0);
    }

    #[test]
    fn stale_snapshots_can_be_rejected() {
        let mut gm = host();
        let old = gm.broadcast().unwrap();
        gm.apply(|e| e.fire_bad_confetti().bad_confetti).unwrap();
        let new = gm.broadcast().unwrap();

        let config = SessionConfig::for_user("p1").with_stale_snapshot_rejection(true);
        let mut ada = PlayerClient::new(&config, "gm");
        assert_eq!(ada.handle_event(PeerEvent::message("gm", text(&new))), Reconciliation::Applied);
        assert_eq!(ada.handle_event(PeerEvent::message("gm", text(&old))), Reconciliation::Ignored);
        assert_eq!(ada.handle_event(PeerEvent::message("gm", text(&new))), Reconciliation::Ignored);
        assert_eq!(ada.engine().session().bad_confetti, 1);
        assert_eq!(ada.last_revision(), Some(3));
    }
}
