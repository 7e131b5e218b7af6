//! Session payloads: configuration, readiness and interrupts.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::Id;

/// How the client delivers its input for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum InputMode {
    /// Raw audio over the binary channel
    Audio = 0,
    /// A single text message
    #[default]
    Text = 1,
}

/// PCM audio layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Number of interleaved channels
    pub nchannels: u16,
    /// Samples per second
    pub sample_rate: u32,
    /// Bytes per sample
    pub sample_width: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self { nchannels: 1, sample_rate: 16_000, sample_width: 2 }
    }
}

/// Client session configuration.
///
/// # Protocol Flow
///
/// First event a client sends. The server answers with [`Ready`], filling in
/// `chat_id` when the client did not supply one. Read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input mode for every request of the session
    pub input_mode: InputMode,

    /// Chat to resume; assigned by the server when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<Id>,

    /// Whether the client wants text output
    pub output_text: bool,

    /// Whether the client wants audio output
    pub output_audio: bool,

    /// Whether the client wants video output
    pub output_video: bool,

    /// Seconds of silence that end audio input, if the server should detect it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence_duration: Option<f64>,

    /// Layout of audio input chunks
    pub audio: AudioFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Text,
            chat_id: None,
            output_text: true,
            output_audio: true,
            output_video: true,
            silence_duration: None,
            audio: AudioFormat::default(),
        }
    }
}

impl Config {
    /// Configuration for audio input with default format.
    #[must_use]
    pub fn audio() -> Self {
        Self { input_mode: InputMode::Audio, ..Self::default() }
    }
}

/// Server acknowledgment that it accepts input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ready {
    /// Chat the session belongs to
    pub chat_id: Id,
    /// Request being served
    pub request_id: Id,
}

/// Why a request was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum InterruptType {
    /// A person asked to stop (barge-in, cancel button)
    User = 0,
    /// The system gave up on the request
    System = 1,
}

/// Interrupt signal; valid from either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    /// Reason for the interrupt
    pub interrupt_type: InterruptType,
}
