//! Session configuration.

use serde::{Deserialize, Serialize};
use tombola_protocol::MIN_PLAYERS;

/// Settings for a single game session.
///
/// The player count is not clamped: a count outside `3..=5` is a caller
/// mistake and [`GameSession::new`](crate::GameSession::new) rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of players, one ticket each.
    pub player_count: usize,

    /// Seed for the session's random source. `None` seeds from the OS.
    /// Fixed seeds make ticket layouts and draw order reproducible, which
    /// is what tests want and what production must not use.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_count: MIN_PLAYERS,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// A config for `player_count` players with an OS-seeded random source.
    pub fn with_players(player_count: usize) -> Self {
        Self {
            player_count,
            ..Default::default()
        }
    }

    /// Builder-style seed override.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_players_unseeded() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.player_count, 3);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn test_seed_defaults_when_missing_from_json() {
        let cfg: SessionConfig = serde_json::from_str(r#"{"player_count":4}"#).unwrap();
        assert_eq!(cfg.player_count, 4);
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn test_seeded_builder() {
        let cfg = SessionConfig::with_players(5).seeded(7);
        assert_eq!(cfg.player_count, 5);
        assert_eq!(cfg.seed, Some(7));
    }
}
