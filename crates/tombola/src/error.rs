//! Unified error type for the tombola workspace.

use tombola_engine::EngineError;
use tombola_protocol::ProtocolError;
use tombola_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// Each variant has a `#[from]`, so `?` converts sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum TombolaError {
    /// Encoding, decoding, or an out-of-range number in a request.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session rejected an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The room is missing or its actor is gone.
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use tombola_engine::GenerationError;
    use tombola_protocol::{RoomId, SessionStatus};

    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let tombola_err: TombolaError = err.into();
        assert!(matches!(tombola_err, TombolaError::Protocol(_)));
        assert!(tombola_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_engine_error() {
        let err = EngineError::InvalidTransition {
            operation: "draw_next",
            state: SessionStatus::Waiting,
        };
        let tombola_err: TombolaError = err.into();
        assert!(matches!(tombola_err, TombolaError::Engine(_)));
        assert_eq!(
            tombola_err.to_string(),
            "cannot draw_next while session is waiting"
        );
    }

    #[test]
    fn test_generation_error_reaches_top_level() {
        let err: EngineError = GenerationError::InvalidPlayerCount(9).into();
        let tombola_err: TombolaError = err.into();
        assert!(tombola_err.to_string().contains('9'));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId(1));
        let tombola_err: TombolaError = err.into();
        assert!(matches!(tombola_err, TombolaError::Room(_)));
        assert_eq!(tombola_err.to_string(), "room R-1 not found");
    }
}
