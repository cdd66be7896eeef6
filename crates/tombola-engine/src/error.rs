//! Error types for the engine layer.

use tombola_protocol::SessionStatus;

/// Errors raised while dealing tickets.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Tickets are only dealt for tables of 3 to 5 players.
    #[error("player count must be between 3 and 5, got {0}")]
    InvalidPlayerCount(usize),

    /// A hand-built grid broke one of the ticket layout rules.
    #[error("invalid ticket layout: {0}")]
    InvalidLayout(String),
}

/// Errors returned by [`GameSession`](crate::GameSession) operations.
///
/// Every variant is recoverable: the session stays usable afterwards.
/// `PoolExhausted` is the only one that also finishes it.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The operation is not legal in the session's current state,
    /// e.g. drawing before `start` or marking after a full house.
    #[error("cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionStatus,
    },

    /// All 90 numbers have already been called.
    #[error("no numbers left to draw")]
    PoolExhausted,

    /// The number is not printed on the player's ticket.
    #[error("number {number} is not on player {player}'s ticket")]
    InvalidMark { player: usize, number: u8 },

    /// No player sits at this index.
    #[error("no player at index {0}")]
    UnknownPlayer(usize),
}
