//! In-process transport joining a GM host and its players.
//!
//! Used by tests and the table simulation. Messages are queued as encoded
//! JSON text and delivered in send order, one at a time.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, trace};

use crate::config::SessionConfig;
use crate::engine::SessionEngine;
use crate::error::{SessionError, SessionResult};
use crate::member::MemberId;
use crate::peer::{GmHost, Outbound, PeerEvent, PlayerClient, Target, Transport, dispatch};

/// A queue of messages between connected peers.
#[derive(Debug)]
pub struct LoopbackHub {
    gm: MemberId,
    players: Vec<MemberId>,
    queue: VecDeque<(MemberId, MemberId, String)>,
}

impl LoopbackHub {
    /// A hub whose GM is reachable as `gm`.
    pub fn new(gm: MemberId) -> Self {
        Self {
            gm,
            players: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// Register a player connection.
    pub fn connect(&mut self, peer: MemberId) {
        if !self.players.contains(&peer) {
            self.players.push(peer);
        }
    }

    /// Drop a player connection and any messages addressed to it.
    pub fn disconnect(&mut self, peer: &MemberId) {
        self.players.retain(|p| p != peer);
        self.queue.retain(|(_, to, _)| to != peer);
    }

    /// A transport sending as `from`.
    pub fn endpoint(&mut self, from: MemberId) -> Endpoint<'_> {
        Endpoint { hub: self, from }
    }

    /// Number of queued deliveries.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pop the next delivery as `(recipient, event)`.
    pub fn deliver_next(&mut self) -> Option<(MemberId, PeerEvent)> {
        let (from, to, text) = self.queue.pop_front()?;
        trace!(from = %from, to = %to, "delivering");
        Some((to, PeerEvent::message(from, text)))
    }

    fn enqueue(&mut self, from: &MemberId, outbound: Outbound) -> SessionResult<()> {
        let text = outbound.message.to_json()?;
        let recipients: Vec<MemberId> = match outbound.target {
            Target::Broadcast => std::iter::once(&self.gm)
                .chain(self.players.iter())
                .filter(|p| *p != from)
                .cloned()
                .collect(),
            Target::Peer(peer) => vec![peer],
        };
        for to in recipients {
            self.queue.push_back((from.clone(), to, text.clone()));
        }
        Ok(())
    }
}

/// One peer's sending side of a [`LoopbackHub`].
pub struct Endpoint<'a> {
    hub: &'a mut LoopbackHub,
    from: MemberId,
}

impl Transport for Endpoint<'_> {
    fn send(&mut self, outbound: Outbound) -> SessionResult<()> {
        self.hub.enqueue(&self.from, outbound)
    }
}

/// A GM and its players wired through a [`LoopbackHub`].
pub struct LocalTable {
    gm: GmHost,
    players: BTreeMap<MemberId, PlayerClient>,
    hub: LoopbackHub,
    config: SessionConfig,
}

impl LocalTable {
    /// Host a table as the participant in `config`.
    pub fn new(config: &SessionConfig) -> Self {
        let gm = GmHost::new(config);
        let hub = LoopbackHub::new(gm.engine().gm_id().clone());
        Self {
            gm,
            players: BTreeMap::new(),
            hub,
            config: config.clone(),
        }
    }

    /// The GM side.
    pub fn gm(&self) -> &GmHost {
        &self.gm
    }

    /// A connected player's client.
    pub fn player(&self, id: &MemberId) -> Option<&PlayerClient> {
        self.players.get(id)
    }

    /// Ids of connected players, in order.
    pub fn player_ids(&self) -> impl Iterator<Item = &MemberId> {
        self.players.keys()
    }

    /// Connect a player and let the GM seat them.
    pub fn join(&mut self, id: MemberId, name: Option<&str>) -> SessionResult<()> {
        let mut config = SessionConfig::for_user(id.as_str())
            .with_default_points(self.config.default_points.clone())
            .with_stale_snapshot_rejection(self.config.reject_stale_snapshots);
        if let Some(seed) = self.config.seed {
            config = config.with_seed(seed.wrapping_add(self.players.len() as u64 + 1));
        }
        let client = PlayerClient::new(&config, self.gm.engine().gm_id().clone());
        self.players.insert(id.clone(), client);
        self.hub.connect(id.clone());
        let outbound = self.gm.handle_event(PeerEvent::joined(id, name))?;
        self.send_as_gm(outbound)?;
        self.pump()
    }

    /// Disconnect a player.
    pub fn leave(&mut self, id: &MemberId) -> SessionResult<()> {
        self.players.remove(id);
        self.hub.disconnect(id);
        let outbound = self.gm.handle_event(PeerEvent::left(id.clone()))?;
        self.send_as_gm(outbound)?;
        self.pump()
    }

    /// Run a local GM action, broadcast, and deliver.
    pub fn gm_action<T>(
        &mut self,
        action: impl FnOnce(&mut SessionEngine) -> T,
    ) -> SessionResult<T> {
        let (value, outbound) = self.gm.apply(action)?;
        self.send_as_gm([outbound])?;
        self.pump()?;
        Ok(value)
    }

    /// Run a player action, send it to the GM, and deliver.
    pub fn player_action(
        &mut self,
        id: &MemberId,
        action: impl FnOnce(&mut PlayerClient) -> SessionResult<Outbound>,
    ) -> SessionResult<()> {
        let client = self
            .players
            .get_mut(id)
            .ok_or_else(|| SessionError::MemberNotFound(id.clone()))?;
        let outbound = action(client)?;
        dispatch(&mut self.hub.endpoint(id.clone()), [outbound])?;
        self.pump()
    }

    /// Deliver queued messages until the hub is idle.
    pub fn pump(&mut self) -> SessionResult<()> {
        let gm_id = self.gm.engine().gm_id().clone();
        let mut delivered = 0usize;
        while let Some((to, event)) = self.hub.deliver_next() {
            delivered += 1;
            if to == gm_id {
                let outbound = self.gm.handle_event(event)?;
                self.send_as_gm(outbound)?;
            } else if let Some(client) = self.players.get_mut(&to) {
                client.handle_event(event);
            }
        }
        debug!(delivered, "hub idle");
        Ok(())
    }

    /// True when every player holds exactly the GM's session.
    pub fn is_consistent(&self) -> bool {
        let canonical = self.gm.engine().session();
        self.players
            .values()
            .all(|p| p.engine().session() == canonical)
    }

    fn send_as_gm(&mut self, outbound: impl IntoIterator<Item = Outbound>) -> SessionResult<()> {
        let gm_id = self.gm.engine().gm_id().clone();
        dispatch(&mut self.hub.endpoint(gm_id), outbound)
    }
}
