//! Boundary protocol for the tombola engine.
//!
//! This crate defines what a transport (HTTP, RPC, an in-process caller)
//! exchanges with a running session:
//!
//! - **Types** ([`Request`], [`Response`], [`AchievementReport`], etc.) —
//!   the request/response shapes of every boundary operation.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those shapes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer is the bottom of the stack. It knows nothing about
//! tickets being generated or numbers being drawn, only how results look
//! once they cross the boundary.
//!
//! ```text
//! Transport (bytes) → Protocol (Request) → Room actor → GameSession
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode_create_session, decode_request, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AchievementKind, AchievementReport, Award, CreateSession, MarkedByPlayer,
    Ranking, Request, Response, RoomEvent, RoomId, SessionStatus, TicketGrid,
    COLUMNS, MAX_NUMBER, MAX_PLAYERS, MIN_PLAYERS, NUMBERS_PER_TICKET, ROWS,
};
