//! Wire format for the Stagewire protocol.
//!
//! Structured events travel as JSON text frames. Every frame is a single JSON
//! object carrying an integer `event_type` discriminant next to the variant's
//! fields, so a decoder can dispatch on the discriminant before touching the
//! rest of the payload.
//!
//! Media chunks bypass JSON entirely and travel as binary frames. The server
//! prefixes each chunk with the raw 16-byte content id it belongs to; the
//! client sends bare payload bytes because a request has exactly one input
//! media stream.
//!
//! # Security
//!
//! Frames above [`MAX_FRAME_SIZE`] are rejected before parsing. Decoding never
//! panics on malformed input; every failure maps to a [`CodecError`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod errors;
pub mod event;
pub mod event_type;
pub mod frame;
pub mod id;
pub mod payloads;

pub use codec::{decode, decode_text, encode, encode_text};
pub use errors::{CodecError, Result};
pub use event::{Event, Origin};
pub use event_type::EventType;
pub use frame::{Direction, ID_LEN, MAX_FRAME_SIZE, WireFrame, decode_binary, encode_binary};
pub use id::Id;
pub use payloads::{
    AudioFormat, Config, Content, ContentAddition, ContentKind, ContentType, InputMedia,
    InputMode, InputText, Interrupt, InterruptType, OutputFunctionCall, OutputMedia, OutputText,
    Ready, Segment, Stage, Transcription, VideoFormat,
};
