//! Session replication for the Spieltisch virtual tabletop.
//!
//! The GM owns the canonical [`Session`]: roster, NPCs, confetti counters,
//! pause flag and shared drawing. Every change is rebroadcast as a complete
//! snapshot, and players replace their local copy wholesale on receipt.
//! Degenerate payloads leave the local copy untouched.

pub mod config;
pub mod engine;
pub mod error;
pub mod loopback;
pub mod member;
pub mod peer;
pub mod protocol;
pub mod session;

pub use config::SessionConfig;
pub use engine::{Reconciliation, RollPhase, SessionEngine, SubscriptionId, decode_snapshot};
pub use error::{SessionError, SessionResult};
pub use loopback::{LocalTable, LoopbackHub};
pub use member::{CharacterRef, DEFAULT_POINTS, GM_NAME, MemberId, SessionMember};
pub use peer::{
    GmHost, Outbound, PeerEvent, PeerEventKind, PlayerClient, Target, Transport, dispatch,
};
pub use protocol::{PeerMessage, PlayerAction};
pub use session::{DrawDoc, GameMaster, Session};
