//! Client error types.

use stagewire_core::{StateError, TransportError};
use stagewire_proto::{CodecError, EventType};
use thiserror::Error;

/// Errors returned by client operations and inbound dispatch.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Operation is illegal in the current request state.
    #[error(transparent)]
    State(#[from] StateError),

    /// Frame failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Transport rejected the frame.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Server sent an event only clients may send.
    #[error("client cannot receive {0:?} events")]
    UnexpectedEvent(EventType),
}
