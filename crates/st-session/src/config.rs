//! Configuration for a local session engine.

use crate::member::DEFAULT_POINTS;

/// Configuration for a session engine instance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The local participant's id. The GM member is keyed by it.
    pub user_id: String,
    /// RNG seed for reproducible rolls. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Points given to newly created members.
    pub default_points: String,
    /// Ignore snapshots whose revision is not newer than the last applied.
    pub reject_stale_snapshots: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            seed: None,
            default_points: DEFAULT_POINTS.to_string(),
            reject_stale_snapshots: false,
        }
    }
}

impl SessionConfig {
    /// Config for the participant with the given id.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self::default().with_user_id(user_id)
    }

    /// Set the local participant's id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the starting points for new members.
    pub fn with_default_points(mut self, points: impl Into<String>) -> Self {
        self.default_points = points.into();
        self
    }

    /// Enable or disable stale snapshot rejection.
    pub fn with_stale_snapshot_rejection(mut self, reject: bool) -> Self {
        self.reject_stale_snapshots = reject;
        self
    }
}
