//! Client input payloads.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Text input; at most one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputText {
    /// The user's message
    pub data: String,
}

/// Raw media chunk from the client.
///
/// Travels on the binary channel without any prefix: a request has exactly
/// one input media stream, so there is nothing to address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMedia {
    /// Chunk bytes
    pub data: Bytes,
}
