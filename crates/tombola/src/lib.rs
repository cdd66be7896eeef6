//! # Tombola
//!
//! A multiplayer tombola (bingo/housie) engine. Each player gets a
//! fifteen-number ticket, numbers 1–90 are called without repetition, and
//! players earn `first_five`, `early_seven`, and `full_house` by marking
//! called numbers. The first full house ends the game.
//!
//! The workspace is layered:
//!
//! ```text
//! tombola-protocol   Request / Response / RoomEvent, JSON codec
//! tombola-engine     GameSession: tickets, pouch, marks, achievements
//! tombola-tick       DrawTimer for auto-draw
//! tombola-room       one actor per session, RoomManager
//! ```
//!
//! This crate re-exports the parts callers need and adds a unified
//! [`TombolaError`] plus a byte-level [`Boundary`] for transports.
//! [`telemetry::init`] installs a log subscriber for binaries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tombola::prelude::*;
//!
//! # async fn run() -> Result<(), TombolaError> {
//! let mut rooms = RoomManager::new();
//! let Response::SessionCreated { room_id, .. } =
//!     rooms.create_room(CreateSession { player_count: 3 })?
//! else {
//!     unreachable!()
//! };
//! rooms.request(room_id, Request::StartSession).await?;
//! let drawn = rooms.request(room_id, Request::DrawNext).await?;
//! # Ok(())
//! # }
//! ```

mod boundary;
mod error;
pub mod telemetry;

pub use boundary::Boundary;
pub use error::TombolaError;

pub use tombola_engine as engine;
pub use tombola_protocol as protocol;
pub use tombola_room as room;
pub use tombola_tick as tick;

pub mod prelude {
    pub use crate::{Boundary, TombolaError};
    pub use tombola_engine::{GameSession, SessionConfig, Ticket};
    pub use tombola_protocol::{
        AchievementKind, AchievementReport, Codec, CreateSession, JsonCodec, MarkedByPlayer,
        Request, Response, RoomEvent, RoomId, SessionStatus,
    };
    pub use tombola_room::{RoomConfig, RoomHandle, RoomManager};
}
