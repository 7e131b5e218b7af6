//! Event type discriminants.
//!
//! The discriminant is the integer stored in the `event_type` field of every
//! text frame. Values are part of the wire format and must never be reused.

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Discriminant identifying an event's concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum EventType {
    /// Client session configuration
    Config = 0,
    /// Client text input
    InputText = 1,
    /// Client media chunk (binary channel)
    InputMedia = 2,
    /// Client end of input
    InputEnd = 3,
    /// Interrupt from either side
    Interrupt = 4,
    /// Server ready acknowledgment
    Ready = 5,
    /// Server transcription of audio input
    Transcription = 6,
    /// Server stage declaration
    Stage = 7,
    /// Server content declaration
    Content = 8,
    /// Server metadata for existing content
    ContentAddition = 9,
    /// Server text chunk
    OutputText = 10,
    /// Server media chunk (binary channel)
    OutputMedia = 11,
    /// Server function call payload
    OutputFunctionCall = 12,
    /// Server end of output
    OutputEnd = 13,
    /// End of session from either side
    SessionEnd = 14,
}

impl EventType {
    /// Every defined event type, in discriminant order.
    pub const ALL: [Self; 15] = [
        Self::Config,
        Self::InputText,
        Self::InputMedia,
        Self::InputEnd,
        Self::Interrupt,
        Self::Ready,
        Self::Transcription,
        Self::Stage,
        Self::Content,
        Self::ContentAddition,
        Self::OutputText,
        Self::OutputMedia,
        Self::OutputFunctionCall,
        Self::OutputEnd,
        Self::SessionEnd,
    ];

    /// Convert a raw discriminant into an event type.
    ///
    /// Returns `None` for values no variant uses.
    pub fn from_u64(value: u64) -> Option<Self> {
        let index = usize::try_from(value).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Raw discriminant value.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether this event travels on the binary channel.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::InputMedia | Self::OutputMedia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_match_table_order() {
        for (index, event_type) in EventType::ALL.iter().enumerate() {
            assert_eq!(usize::from(event_type.to_u8()), index);
            assert_eq!(EventType::from_u64(index as u64), Some(*event_type));
        }
    }

    #[test]
    fn unknown_values_rejected() {
        assert_eq!(EventType::from_u64(15), None);
        assert_eq!(EventType::from_u64(u64::MAX), None);
    }

    #[test]
    fn only_media_is_binary() {
        let binary: Vec<_> = EventType::ALL.iter().filter(|t| t.is_binary()).collect();
        assert_eq!(binary, vec![&EventType::InputMedia, &EventType::OutputMedia]);
    }
}
