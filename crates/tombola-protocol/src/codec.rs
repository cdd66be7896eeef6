//! Codec trait and implementations for boundary messages.
//!
//! The engine does not care how a transport serializes requests. It only
//! needs something that implements [`Codec`]. [`JsonCodec`] is the one
//! shipped today; a binary codec can be added without touching the rest
//! of the workspace.

use serde::{de::DeserializeOwned, Serialize};

use crate::{CreateSession, ProtocolError, Request};

/// A codec that can encode boundary values to bytes and decode them back.
///
/// `Send + Sync + 'static` because a codec is typically stored next to a
/// long-lived room handle and used from any Tokio worker.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tombola_protocol::{Codec, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Request::ToggleMark { player: 0, number: 42 }).unwrap();
/// let decoded: Request = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, Request::ToggleMark { player: 0, number: 42 });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

/// Decodes a [`CreateSession`] and checks the player count.
pub fn decode_create_session<C: Codec>(
    codec: &C,
    data: &[u8],
) -> Result<CreateSession, ProtocolError> {
    let request: CreateSession = codec.decode(data)?;
    request.validate()?;
    Ok(request)
}

/// Decodes a [`Request`] and applies the boundary range checks.
pub fn decode_request<C: Codec>(codec: &C, data: &[u8]) -> Result<Request, ProtocolError> {
    let request: Request = codec.decode(data)?;
    request.validate()?;
    Ok(request)
}
