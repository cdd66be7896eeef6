//! Byte-level entry point for transports.
//!
//! A transport hands over raw request bytes and gets raw response bytes
//! back. The flow for each call is:
//!   1. Decode with the configured [`Codec`] and range-check the request
//!   2. Look up the room, holding the manager lock only for the lookup
//!   3. Await the room actor's reply
//!   4. Encode the [`Response`]

use tokio::sync::Mutex;
use tombola_protocol::{decode_create_session, decode_request, Codec, Response, RoomId};
use tombola_room::{EventReceiver, RoomConfig, RoomManager};

use crate::TombolaError;

/// Shared state behind every transport connection.
///
/// Cheap to share behind an `Arc`; the room manager is the only thing
/// behind a lock and room actors do their own serialization.
pub struct Boundary<C: Codec> {
    rooms: Mutex<RoomManager>,
    codec: C,
}

impl<C: Codec> Boundary<C> {
    pub fn new(codec: C, config: RoomConfig) -> Self {
        Self {
            rooms: Mutex::new(RoomManager::with_config(config)),
            codec,
        }
    }

    /// Handles an encoded [`CreateSession`](tombola_protocol::CreateSession)
    /// after checking the player count, and returns the encoded
    /// [`Response::SessionCreated`].
    pub async fn create_session(&self, data: &[u8]) -> Result<Vec<u8>, TombolaError> {
        let request = decode_create_session(&self.codec, data)?;
        let response = self.rooms.lock().await.create_room(request)?;
        self.encode(&response)
    }

    /// Handles an encoded [`Request`](tombola_protocol::Request) for one
    /// session.
    pub async fn handle(&self, room_id: RoomId, data: &[u8]) -> Result<Vec<u8>, TombolaError> {
        let request = decode_request(&self.codec, data)?;
        let handle = self.rooms.lock().await.get(room_id)?;
        tracing::debug!(%room_id, ?request, "boundary request");
        let response = handle.request(request).await?;
        self.encode(&response)
    }

    /// Opens an event feed for one session.
    pub async fn subscribe(&self, room_id: RoomId) -> Result<EventReceiver, TombolaError> {
        let handle = self.rooms.lock().await.get(room_id)?;
        Ok(handle.subscribe().await?)
    }

    /// Shuts a session's room down.
    ///
    /// The room is unregistered under the lock; the shutdown is sent after
    /// it is released, so a busy room cannot stall other sessions.
    pub async fn destroy_session(&self, room_id: RoomId) -> Result<(), TombolaError> {
        let handle = self.rooms.lock().await.remove_room(room_id)?;
        if let Err(err) = handle.shutdown().await {
            tracing::debug!(%room_id, error = %err, "room already stopped");
        }
        tracing::info!(%room_id, "session destroyed");
        Ok(())
    }

    fn encode(&self, response: &Response) -> Result<Vec<u8>, TombolaError> {
        Ok(self.codec.encode(response)?)
    }
}
