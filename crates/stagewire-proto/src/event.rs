//! The event sum type.

use crate::{
    Config, Content, ContentAddition, EventType, Id, InputMedia, InputText, Interrupt,
    OutputFunctionCall, OutputMedia, OutputText, Ready, Stage, Transcription,
};

/// Which side of a session may emit an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Only the client sends it
    Client,
    /// Only the server sends it
    Server,
    /// Either side may send it
    Either,
}

/// Every event exchanged between client and server.
///
/// Dispatch is resolved once, at decode time, into one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Session configuration (client)
    Config(Config),
    /// Text input (client)
    InputText(InputText),
    /// Media input chunk (client, binary)
    InputMedia(InputMedia),
    /// End of input (client)
    InputEnd,
    /// Interrupt (either side)
    Interrupt(Interrupt),
    /// Ready acknowledgment (server)
    Ready(Ready),
    /// Transcription of audio input (server)
    Transcription(Transcription),
    /// Stage declaration (server)
    Stage(Stage),
    /// Content declaration (server)
    Content(Content),
    /// Metadata for existing content (server)
    ContentAddition(ContentAddition),
    /// Text chunk (server)
    OutputText(OutputText),
    /// Media chunk (server, binary)
    OutputMedia(OutputMedia),
    /// Function call payload (server)
    OutputFunctionCall(OutputFunctionCall),
    /// End of output (server)
    OutputEnd,
    /// End of session (either side)
    SessionEnd,
}

impl Event {
    /// Discriminant of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Config(_) => EventType::Config,
            Self::InputText(_) => EventType::InputText,
            Self::InputMedia(_) => EventType::InputMedia,
            Self::InputEnd => EventType::InputEnd,
            Self::Interrupt(_) => EventType::Interrupt,
            Self::Ready(_) => EventType::Ready,
            Self::Transcription(_) => EventType::Transcription,
            Self::Stage(_) => EventType::Stage,
            Self::Content(_) => EventType::Content,
            Self::ContentAddition(_) => EventType::ContentAddition,
            Self::OutputText(_) => EventType::OutputText,
            Self::OutputMedia(_) => EventType::OutputMedia,
            Self::OutputFunctionCall(_) => EventType::OutputFunctionCall,
            Self::OutputEnd => EventType::OutputEnd,
            Self::SessionEnd => EventType::SessionEnd,
        }
    }

    /// Side of the session allowed to emit this event.
    pub fn origin(&self) -> Origin {
        match self {
            Self::Config(_) | Self::InputText(_) | Self::InputMedia(_) | Self::InputEnd => {
                Origin::Client
            },
            Self::Interrupt(_) | Self::SessionEnd => Origin::Either,
            Self::Ready(_)
            | Self::Transcription(_)
            | Self::Stage(_)
            | Self::Content(_)
            | Self::ContentAddition(_)
            | Self::OutputText(_)
            | Self::OutputMedia(_)
            | Self::OutputFunctionCall(_)
            | Self::OutputEnd => Origin::Server,
        }
    }

    /// Content id the event refers to, if any.
    pub fn content_id(&self) -> Option<Id> {
        match self {
            Self::Content(content) => Some(content.id),
            Self::ContentAddition(addition) => Some(addition.content_id),
            Self::OutputText(text) => Some(text.content_id),
            Self::OutputMedia(media) => Some(media.content_id),
            Self::OutputFunctionCall(call) => Some(call.content_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn media_events_report_binary_types() {
        let input = Event::InputMedia(InputMedia { data: Bytes::from_static(b"pcm") });
        assert!(input.event_type().is_binary());
        assert_eq!(input.origin(), Origin::Client);

        let output = Event::OutputMedia(OutputMedia {
            content_id: Id::from_u128(7),
            data: Bytes::new(),
        });
        assert!(output.event_type().is_binary());
        assert_eq!(output.origin(), Origin::Server);
        assert_eq!(output.content_id(), Some(Id::from_u128(7)));
    }

    #[test]
    fn interrupt_and_session_end_flow_both_ways() {
        assert_eq!(Event::SessionEnd.origin(), Origin::Either);
        let interrupt =
            Event::Interrupt(Interrupt { interrupt_type: crate::InterruptType::User });
        assert_eq!(interrupt.origin(), Origin::Either);
        assert_eq!(interrupt.content_id(), None);
    }
}
