//! Content creation requests.
//!
//! Callers may reference content that already exists (by id) or ask for new
//! content, in which case every kind parameter must be present. Parameters
//! are therefore optional here and only resolved into a
//! [`ContentKind`] when new content is actually created.

use stagewire_proto::{AudioFormat, ContentKind, ContentType, VideoFormat};

use crate::StateError;

/// Optional audio format fields for new audio content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioParams {
    /// Number of channels
    pub nchannels: Option<u16>,
    /// Samples per second
    pub sample_rate: Option<u32>,
    /// Bytes per sample
    pub sample_width: Option<u16>,
}

impl From<AudioFormat> for AudioParams {
    fn from(format: AudioFormat) -> Self {
        Self {
            nchannels: Some(format.nchannels),
            sample_rate: Some(format.sample_rate),
            sample_width: Some(format.sample_width),
        }
    }
}

/// Optional video format fields for new video content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoParams {
    /// Frames per second
    pub fps: Option<u32>,
    /// Frame width in pixels
    pub width: Option<u32>,
    /// Frame height in pixels
    pub height: Option<u32>,
}

impl From<VideoFormat> for VideoParams {
    fn from(format: VideoFormat) -> Self {
        Self { fps: Some(format.fps), width: Some(format.width), height: Some(format.height) }
    }
}

/// What kind of content an operation wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRequest {
    /// Text content
    Text,
    /// Function call content
    FunctionCall,
    /// Audio content with its format, if new
    Audio(AudioParams),
    /// Video content with its format, if new
    Video(VideoParams),
}

impl ContentRequest {
    /// Wire tag of the requested kind.
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text => ContentType::Text,
            Self::FunctionCall => ContentType::FunctionCall,
            Self::Audio(_) => ContentType::Audio,
            Self::Video(_) => ContentType::Video,
        }
    }

    /// Resolve into a concrete kind for new content.
    ///
    /// Absent or zero parameters are rejected with
    /// [`StateError::MissingRequiredParameters`] naming the first offender.
    pub fn resolve(&self) -> Result<ContentKind, StateError> {
        match *self {
            Self::Text => Ok(ContentKind::Text),
            Self::FunctionCall => Ok(ContentKind::FunctionCall),
            Self::Audio(params) => Ok(ContentKind::Audio(AudioFormat {
                nchannels: required(params.nchannels, "nchannels")?,
                sample_rate: required(params.sample_rate, "sample_rate")?,
                sample_width: required(params.sample_width, "sample_width")?,
            })),
            Self::Video(params) => Ok(ContentKind::Video(VideoFormat {
                fps: required(params.fps, "fps")?,
                width: required(params.width, "width")?,
                height: required(params.height, "height")?,
            })),
        }
    }
}

fn required<T: Default + PartialEq>(value: Option<T>, name: &'static str) -> Result<T, StateError> {
    match value {
        Some(value) if value != T::default() => Ok(value),
        _ => Err(StateError::MissingRequiredParameters(name)),
    }
}
