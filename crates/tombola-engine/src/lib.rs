//! Game engine for multiplayer tombola sessions.
//!
//! The engine is plain owned data: a [`GameSession`] is mutated through
//! `&mut self` and knows nothing about tasks, channels, or transports.
//! Serializing access to a session is the room layer's job.
//!
//! # Key types
//!
//! - [`GameSession`] — the `waiting → active → finished` state machine and
//!   the only entry point callers need
//! - [`Ticket`] — a 3×9 grid of fifteen numbers, see [`generate_ticket`]
//! - [`DrawPool`] — undrawn numbers plus the ordered call history
//! - [`PlayerState`] — a player's ticket, marks, points, and awards
//! - [`AchievementLedger`] — every award in the order it was granted

mod achievement;
mod config;
mod draw;
mod error;
mod player;
mod session;
mod ticket;

pub use achievement::{evaluate, rankings, AchievementLedger, PassOutcome};
pub use config::SessionConfig;
pub use draw::{Draw, DrawPool};
pub use error::{EngineError, GenerationError};
pub use player::PlayerState;
pub use session::{DrawOutcome, GameSession, MarkOutcome};
pub use ticket::{column_of, column_range, generate_ticket, generate_tickets, Ticket};
