//! Codec error types.

use thiserror::Error;

use crate::EventType;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while encoding or decoding frames.
///
/// A decode error only ever concerns the single frame being decoded; no
/// protocol state is touched until a frame decodes successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Text frame has no `event_type` field (or it is null).
    #[error("text frame is missing the event_type discriminant")]
    MissingDiscriminant,

    /// Text frame names an event type this protocol does not define.
    #[error("unknown event_type discriminant: {0}")]
    UnknownDiscriminant(String),

    /// Frame does not match the schema of its event variant.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Binary frame has zero length.
    #[error("binary frame is empty")]
    EmptyFrame,

    /// Frame exceeds [`crate::MAX_FRAME_SIZE`].
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge {
        /// Size of the rejected frame
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// Media events only travel on the binary channel.
    #[error("{0:?} events can only be encoded as binary frames")]
    BinaryOnly(EventType),
}

impl CodecError {
    pub(crate) fn malformed(reason: impl std::fmt::Display) -> Self {
        Self::MalformedPayload(reason.to_string())
    }
}
