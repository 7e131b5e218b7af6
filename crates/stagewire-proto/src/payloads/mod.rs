//! Event payload types.
//!
//! Payloads are grouped by the phase of a request they belong to:
//! - [`session`]: configuration, readiness, interrupts
//! - [`input`]: client input (text and media)
//! - [`output`]: server output (stages, content, data)

pub mod input;
pub mod output;
pub mod session;

pub use input::{InputMedia, InputText};
pub use output::{
    Content, ContentAddition, ContentKind, ContentType, OutputFunctionCall, OutputMedia,
    OutputText, Segment, Stage, Transcription, VideoFormat,
};
pub use session::{AudioFormat, Config, InputMode, Interrupt, InterruptType, Ready};
