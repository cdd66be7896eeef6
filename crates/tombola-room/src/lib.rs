//! Room actors for tombola sessions.
//!
//! Each room runs as an isolated Tokio task that owns one
//! [`GameSession`](tombola_engine::GameSession). Every boundary operation
//! on that session is a command on the room's channel, so mutations of a
//! single session never overlap while different rooms run in parallel.
//! Auto-draw is a timer branch of the same loop.
//!
//! # Key types
//!
//! - [`RoomManager`] — creates, looks up, and destroys rooms
//! - [`RoomHandle`] — sends [`Request`](tombola_protocol::Request)s to a
//!   running room and subscribes to its events
//! - [`RoomConfig`] — auto-draw and channel settings
//! - [`RoomInfo`] — a metadata snapshot of one room

mod config;
mod error;
mod manager;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{EventReceiver, RoomHandle, RoomInfo};
