//! Harness error types.

use stagewire_client::ClientError;
use stagewire_server::ServerError;
use thiserror::Error;

/// Errors raised while driving a conversation.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The other end of an in-memory channel was dropped.
    #[error("in-memory peer disconnected")]
    Disconnected,

    /// The client rejected a delivered frame.
    #[error("client rejected frame: {0}")]
    Client(#[from] ClientError),

    /// The server rejected a delivered frame.
    #[error("server rejected frame: {0}")]
    Server(#[from] ServerError),
}
