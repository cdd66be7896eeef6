//! Error types for the room layer.

use tombola_engine::EngineError;
use tombola_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room's command channel is closed, or the actor dropped the
    /// reply.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The session rejected the request.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
