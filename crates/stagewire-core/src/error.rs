//! State error types.

use stagewire_proto::{ContentType, Id, InputMode};
use thiserror::Error;

/// Errors raised when an operation is illegal in the current request state.
///
/// A failed operation never changes state; the caller may retry something
/// else on the same state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// `ready` was already accepted for this session.
    #[error("request is already ready")]
    AlreadyReady,

    /// Operation requires a ready request.
    #[error("request is not ready")]
    NotReady,

    /// Client configuration can only be sent once.
    #[error("config has already been sent")]
    ConfigAlreadySent,

    /// Input was already ended for this request.
    #[error("input has already been ended")]
    InputAlreadyEnded,

    /// Output operations require ended input.
    #[error("input has not been ended")]
    InputNotEnded,

    /// Output was already ended for this request.
    #[error("output has already been ended")]
    OutputAlreadyEnded,

    /// Request was interrupted; only `reset` or `end_session` remain legal.
    #[error("request has been interrupted")]
    Interrupted,

    /// Interrupt is a one-shot transition.
    #[error("request has already been interrupted")]
    AlreadyInterrupted,

    /// Session is over; nothing else is legal.
    #[error("session has ended")]
    SessionEnded,

    /// Stage or content id is already registered in this request.
    #[error("id {0} is already registered")]
    DuplicateId(Id),

    /// Referenced stage or content does not exist.
    #[error("unknown stage or content {0}")]
    UnknownReference(Id),

    /// Parent link would close a loop in the stage forest.
    #[error("placing stage {stage} under {parent} would create a cycle")]
    CircularHierarchy {
        /// Stage being inserted or moved
        stage: Id,
        /// Requested parent
        parent: Id,
    },

    /// Stream for this content is already open.
    #[error("stream for content {0} is already open")]
    StreamAlreadyOpen(Id),

    /// No open stream for this content.
    #[error("stream for content {0} is not open")]
    StreamNotOpen(Id),

    /// Output cannot end while streams are open.
    #[error("streams still open: {}", id_list(.0))]
    StreamStillOpen(Vec<Id>),

    /// Function call content is always single-shot.
    #[error("content {0} cannot be streamed")]
    UnsupportedStreamingType(Id),

    /// Content already has its data.
    #[error("content {0} already has data")]
    AlreadyAssociated(Id),

    /// Output cannot end while content lacks data.
    #[error("content without data: {}", id_list(.0))]
    IncompleteContent(Vec<Id>),

    /// Existing content has a different kind than requested.
    #[error("content {id} is {actual:?}, expected {expected:?}")]
    ContentKindMismatch {
        /// Content id
        id: Id,
        /// Kind the operation needs
        expected: ContentType,
        /// Kind the content was created with
        actual: ContentType,
    },

    /// Text input is limited to one message per request.
    #[error("text input has already been sent for this request")]
    TextAlreadySent,

    /// Operation does not match the configured input mode.
    #[error("input mode is {actual:?}, operation requires {expected:?}")]
    WrongInputMode {
        /// Mode the operation needs
        expected: InputMode,
        /// Mode from the session config
        actual: InputMode,
    },

    /// New content needs a parameter the caller did not supply.
    #[error("missing required parameter: {0}")]
    MissingRequiredParameters(&'static str),
}

fn id_list(ids: &[Id]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
