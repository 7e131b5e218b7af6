//! Server output payloads.
//!
//! Output is organised as a forest of stages. Each stage holds typed content,
//! and each content item receives its data either as one payload or as a
//! stream of chunks.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{AudioFormat, Id};

/// One timed piece of a transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Recognised text
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
}

/// Running transcription of the client's audio input.
///
/// Sent while the client is still speaking; each event replaces the previous
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Segments recognised so far
    pub segments: Vec<Segment>,
}

/// Named phase of output, optionally nested under a parent stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage id, unique within the request
    pub id: Id,
    /// Parent stage, if nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    /// Human-readable title
    pub title: String,
    /// What the stage does
    pub description: String,
}

/// Wire tag for a content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ContentType {
    /// Audio stream
    Audio = 0,
    /// Video stream
    Video = 1,
    /// Text
    Text = 2,
    /// Function call
    FunctionCall = 3,
}

impl ContentType {
    /// Whether content of this type may be delivered as a stream.
    pub fn is_streamable(self) -> bool {
        !matches!(self, Self::FunctionCall)
    }

    /// Whether streamed chunks of this type travel on the binary channel.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

/// Video frame layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoFormat {
    /// Frames per second
    pub fps: u32,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

/// Kind of content and the metadata fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Text, single-shot or streamed
    Text,
    /// Function call, always single-shot JSON
    FunctionCall,
    /// Audio stream
    Audio(AudioFormat),
    /// Video stream
    Video(VideoFormat),
}

impl ContentKind {
    /// Wire tag for this kind.
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text => ContentType::Text,
            Self::FunctionCall => ContentType::FunctionCall,
            Self::Audio(_) => ContentType::Audio,
            Self::Video(_) => ContentType::Video,
        }
    }
}

/// Content declaration belonging to a stage.
///
/// # Protocol Flow
///
/// Must be sent after its stage and before any data for it. On the wire the
/// kind is flattened: `content_type` plus the kind's format fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContent", into = "RawContent")]
pub struct Content {
    /// Content id, unique within the request
    pub id: Id,
    /// Owning stage
    pub stage_id: Id,
    /// Kind and format metadata
    pub kind: ContentKind,
}

/// Flat wire shape of [`Content`].
#[derive(Serialize, Deserialize)]
struct RawContent {
    id: Id,
    stage_id: Id,
    content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nchannels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_width: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

impl TryFrom<RawContent> for Content {
    type Error = String;

    fn try_from(raw: RawContent) -> Result<Self, Self::Error> {
        let kind = match raw.content_type {
            ContentType::Text => ContentKind::Text,
            ContentType::FunctionCall => ContentKind::FunctionCall,
            ContentType::Audio => match (raw.nchannels, raw.sample_rate, raw.sample_width) {
                (Some(nchannels), Some(sample_rate), Some(sample_width)) => {
                    ContentKind::Audio(AudioFormat { nchannels, sample_rate, sample_width })
                },
                _ => {
                    return Err(
                        "audio content requires nchannels, sample_rate and sample_width".into()
                    );
                },
            },
            ContentType::Video => match (raw.fps, raw.width, raw.height) {
                (Some(fps), Some(width), Some(height)) => {
                    ContentKind::Video(VideoFormat { fps, width, height })
                },
                _ => return Err("video content requires fps, width and height".into()),
            },
        };

        Ok(Self { id: raw.id, stage_id: raw.stage_id, kind })
    }
}

impl From<Content> for RawContent {
    fn from(content: Content) -> Self {
        let mut raw = Self {
            id: content.id,
            stage_id: content.stage_id,
            content_type: content.kind.content_type(),
            nchannels: None,
            sample_rate: None,
            sample_width: None,
            fps: None,
            width: None,
            height: None,
        };

        match content.kind {
            ContentKind::Audio(format) => {
                raw.nchannels = Some(format.nchannels);
                raw.sample_rate = Some(format.sample_rate);
                raw.sample_width = Some(format.sample_width);
            },
            ContentKind::Video(format) => {
                raw.fps = Some(format.fps);
                raw.width = Some(format.width);
                raw.height = Some(format.height);
            },
            ContentKind::Text | ContentKind::FunctionCall => {},
        }

        raw
    }
}

/// Supplementary metadata for content that already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAddition {
    /// Content being augmented
    pub content_id: Id,
    /// Arbitrary JSON metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Text chunk for text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputText {
    /// Content the chunk belongs to
    pub content_id: Id,
    /// Chunk text
    pub data: String,
}

/// Function call payload; the data of function call content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFunctionCall {
    /// Content the call belongs to
    pub content_id: Id,
    /// JSON-serialised call
    pub data: String,
}

/// Media chunk for audio or video content.
///
/// Travels on the binary channel, prefixed by the raw content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMedia {
    /// Content the chunk belongs to
    pub content_id: Id,
    /// Chunk bytes
    pub data: Bytes,
}
