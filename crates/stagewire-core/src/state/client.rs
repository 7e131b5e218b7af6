//! Client request state.

use stagewire_proto::{Config, Content, ContentType, Id, InputMode, Stage};

use super::RequestState;
use crate::{OutputRegistry, StateError};

/// Validation state of a client session.
///
/// Validates input before it is sent, and mirrors the server's output
/// registry so that stages, content and data arriving from the server are
/// checked before the application sees them.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    request: RequestState,
    config_sent: bool,
    text_sent: bool,
    output: OutputRegistry,
}

impl ClientState {
    /// Create a state that has not sent its configuration yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle of the current request
    pub fn request(&self) -> &RequestState {
        &self.request
    }

    /// Mirror of the server's output for the current request
    pub fn output(&self) -> &OutputRegistry {
        &self.output
    }

    /// Record that the configuration was sent. Once per session.
    pub fn send_config(&mut self) -> Result<(), StateError> {
        if self.request.session_ended() {
            return Err(StateError::SessionEnded);
        }
        if self.config_sent {
            return Err(StateError::ConfigAlreadySent);
        }
        self.config_sent = true;
        Ok(())
    }

    /// Accept the server's ready acknowledgment.
    pub fn ready(&mut self, config: Config) -> Result<(), StateError> {
        self.request.ready(config)
    }

    /// Record the request's text input. Text mode only, once per request.
    pub fn send_text(&mut self) -> Result<(), StateError> {
        self.request.ensure_input_open()?;
        self.request.ensure_input_mode(InputMode::Text)?;
        if self.text_sent {
            return Err(StateError::TextAlreadySent);
        }
        self.text_sent = true;
        Ok(())
    }

    /// Check that a media chunk may be sent. Audio mode only.
    pub fn check_media(&self) -> Result<(), StateError> {
        self.request.ensure_input_open()?;
        self.request.ensure_input_mode(InputMode::Audio)
    }

    /// End input of the current request.
    pub fn end_input(&mut self) -> Result<(), StateError> {
        self.request.end_input()
    }

    /// Interrupt the current request, dropping the output mirror.
    pub fn interrupt(&mut self) -> Result<(), StateError> {
        self.request.interrupt()?;
        self.output.clear();
        Ok(())
    }

    /// End the session.
    pub fn end_session(&mut self) -> Result<(), StateError> {
        self.request.end_session()
    }

    /// Start the next request of the session.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.request.reset()?;
        self.output.clear();
        self.text_sent = false;
        Ok(())
    }

    fn ensure_receiving_output(&self) -> Result<(), StateError> {
        self.request.ensure_ready()?;
        if self.request.output_ended() {
            return Err(StateError::OutputAlreadyEnded);
        }
        Ok(())
    }

    /// Validate an inbound transcription. Audio mode only.
    pub fn observe_transcription(&self) -> Result<(), StateError> {
        self.ensure_receiving_output()?;
        self.request.ensure_input_mode(InputMode::Audio)
    }

    /// Validate and mirror an inbound stage.
    pub fn observe_stage(&mut self, stage: &Stage) -> Result<(), StateError> {
        self.ensure_receiving_output()?;
        self.output.add_stage(stage.id, stage.parent_id)
    }

    /// Validate and mirror inbound content.
    pub fn observe_content(&mut self, content: &Content) -> Result<(), StateError> {
        self.ensure_receiving_output()?;
        self.output.add_content(content.clone())
    }

    /// Validate inbound metadata for content.
    pub fn observe_content_addition(&self, content_id: Id) -> Result<(), StateError> {
        self.ensure_receiving_output()?;
        self.output.content(content_id).ok_or(StateError::UnknownReference(content_id))?;
        Ok(())
    }

    /// Validate and record an inbound text chunk.
    pub fn observe_text(&mut self, content_id: Id) -> Result<(), StateError> {
        self.observe_data(content_id, |actual| actual == ContentType::Text, ContentType::Text)
    }

    /// Validate and record an inbound media chunk.
    pub fn observe_media(&mut self, content_id: Id) -> Result<(), StateError> {
        self.observe_data(content_id, ContentType::is_media, ContentType::Audio)
    }

    /// Validate and record an inbound function call.
    pub fn observe_function_call(&mut self, content_id: Id) -> Result<(), StateError> {
        self.observe_data(
            content_id,
            |actual| actual == ContentType::FunctionCall,
            ContentType::FunctionCall,
        )
    }

    fn observe_data(
        &mut self,
        content_id: Id,
        accepts: impl Fn(ContentType) -> bool,
        expected: ContentType,
    ) -> Result<(), StateError> {
        self.ensure_receiving_output()?;
        let content =
            self.output.content(content_id).ok_or(StateError::UnknownReference(content_id))?;
        let actual = content.kind.content_type();
        if !accepts(actual) {
            return Err(StateError::ContentKindMismatch { id: content_id, expected, actual });
        }
        self.output.observe_data(content_id)
    }

    /// Validate an inbound acknowledgment that input ended.
    ///
    /// Servers that detect the end of audio input themselves announce it;
    /// input already ended locally makes this a no-op.
    pub fn observe_input_end(&mut self) -> Result<(), StateError> {
        if self.request.input_ended() {
            return self.request.ensure_live();
        }
        self.request.end_input()
    }

    /// Validate an inbound end of output.
    ///
    /// Every mirrored content must have received data. Input still open is
    /// closed implicitly.
    pub fn observe_output_end(&mut self) -> Result<(), StateError> {
        self.ensure_receiving_output()?;
        self.output.check_complete()?;
        if !self.request.input_ended() {
            self.request.end_input()?;
        }
        self.request.end_output()
    }
}
