//! Server error types.

use stagewire_core::{StateError, TransportError};
use stagewire_proto::{CodecError, EventType};
use thiserror::Error;

/// Errors returned by server operations and inbound dispatch.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Operation is illegal in the current request state.
    #[error(transparent)]
    State(#[from] StateError),

    /// Frame failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Transport rejected the frame.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Client sent an event only servers may send.
    #[error("server cannot receive {0:?} events")]
    UnexpectedEvent(EventType),
}

impl ServerError {
    /// The state error, if this is one.
    pub fn as_state(&self) -> Option<&StateError> {
        match self {
            Self::State(err) => Some(err),
            _ => None,
        }
    }
}
