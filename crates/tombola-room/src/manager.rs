//! Room manager: creates, tracks, and destroys rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tombola_engine::{GameSession, SessionConfig};
use tombola_protocol::{CreateSession, Request, Response, RoomId};

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Owns a handle to every live room.
///
/// Rooms are independent: each has its own session, random source, and
/// timer, and nothing is shared between them.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,
    config: RoomConfig,
}

impl RoomManager {
    /// A manager whose rooms use the default [`RoomConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager whose rooms all use `config`.
    pub fn with_config(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Creates a session for `request.player_count` players in a new room.
    ///
    /// Answers with [`Response::SessionCreated`], which carries the new
    /// room's ID and every player's ticket.
    pub fn create_room(&mut self, request: CreateSession) -> Result<Response, RoomError> {
        self.create_room_with(SessionConfig::with_players(request.player_count))
    }

    /// Like [`create_room`](Self::create_room) with full control over the
    /// session, e.g. a fixed seed.
    pub fn create_room_with(&mut self, session: SessionConfig) -> Result<Response, RoomError> {
        let session = GameSession::new(session)?;
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));

        let response = Response::SessionCreated {
            room_id,
            player_count: session.player_count(),
            tickets: session.tickets(),
            state: session.state(),
        };

        let handle = spawn_room(room_id, self.config.clone(), session);
        self.rooms.insert(room_id, handle);
        tracing::info!(%room_id, "room created");
        Ok(response)
    }

    /// A handle to a live room.
    pub fn get(&self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(&room_id)
            .cloned()
            .ok_or(RoomError::NotFound(room_id))
    }

    /// Routes a request to a room.
    pub async fn request(&self, room_id: RoomId, request: Request) -> Result<Response, RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        handle.request(request).await
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        handle.info().await
    }

    /// Info for every room that still answers.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.info().await {
                infos.push(info);
            }
        }
        infos.sort_by_key(|info| info.room_id.0);
        infos
    }

    /// Forgets a room and hands back its handle without stopping it.
    ///
    /// The caller owns the shutdown. Use this when the manager sits behind
    /// a lock that must not be held across the send.
    pub fn remove_room(&mut self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))
    }

    /// Shuts a room down and forgets it.
    pub async fn destroy_room(&mut self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self.remove_room(room_id)?;
        let _ = handle.shutdown().await;

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room IDs.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }
}
