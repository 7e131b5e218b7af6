//! Server request state.

use stagewire_proto::{Config, Content, ContentType, Id, InputMode, Stage};

use super::RequestState;
use crate::{ContentRequest, OutputRegistry, StateError};

/// Validation state of a server session.
///
/// Validates output before it is sent and client input as it arrives.
#[derive(Debug, Clone, Default)]
pub struct ServerState {
    request: RequestState,
    registry: OutputRegistry,
    text_received: bool,
}

impl ServerState {
    /// Create a state waiting for the client's configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle of the current request
    pub fn request(&self) -> &RequestState {
        &self.request
    }

    /// Output registered for the current request
    pub fn registry(&self) -> &OutputRegistry {
        &self.registry
    }

    /// Accept the session configuration.
    pub fn ready(&mut self, config: Config) -> Result<(), StateError> {
        self.request.ready(config)
    }

    /// End input of the current request.
    pub fn end_input(&mut self) -> Result<(), StateError> {
        self.request.end_input()
    }

    /// Interrupt the current request, dropping all output bookkeeping.
    pub fn interrupt(&mut self) -> Result<(), StateError> {
        self.request.interrupt()?;
        self.registry.clear();
        Ok(())
    }

    /// End the session.
    pub fn end_session(&mut self) -> Result<(), StateError> {
        self.request.end_session()
    }

    /// Start the next request of the session.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.request.reset()?;
        self.registry.clear();
        self.text_received = false;
        Ok(())
    }

    /// Check that a transcription may be sent.
    ///
    /// Transcriptions accompany audio input, so they are legal from ready
    /// until output ends, in audio mode only.
    pub fn transcription(&self) -> Result<(), StateError> {
        self.request.ensure_ready()?;
        self.request.ensure_input_mode(InputMode::Audio)?;
        if self.request.output_ended() {
            return Err(StateError::OutputAlreadyEnded);
        }
        Ok(())
    }

    /// Register a stage.
    pub fn add_stage(&mut self, stage: &Stage) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.add_stage(stage.id, stage.parent_id)
    }

    /// Move a registered stage under a new parent.
    pub fn reparent_stage(&mut self, id: Id, parent: Option<Id>) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.reparent(id, parent)
    }

    /// Register content.
    pub fn add_content(&mut self, content: &Content) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.add_content(content.clone())
    }

    /// Resolve a content request without registering anything.
    ///
    /// Returns the existing content with `false` when `content_id` is already
    /// registered, or a new, validated descriptor with `true` when it must be
    /// announced. A new id is generated when none is given.
    ///
    /// # Errors
    ///
    /// - `ContentKindMismatch` if the existing content has another kind
    /// - `MissingRequiredParameters` if new content lacks a stage or format
    /// - `UnknownReference` if the stage is not registered
    pub fn prepare_content(
        &self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        request: &ContentRequest,
    ) -> Result<(Content, bool), StateError> {
        self.request.ensure_output_open()?;

        if let Some(existing) = content_id.and_then(|id| self.registry.content(id)) {
            let actual = existing.kind.content_type();
            if actual != request.content_type() {
                return Err(StateError::ContentKindMismatch {
                    id: existing.id,
                    expected: request.content_type(),
                    actual,
                });
            }
            return Ok((existing.clone(), false));
        }

        let stage_id = stage_id.ok_or(StateError::MissingRequiredParameters("stage_id"))?;
        let kind = request.resolve()?;
        if !self.registry.has_stage(stage_id) {
            return Err(StateError::UnknownReference(stage_id));
        }

        let id = content_id.unwrap_or_else(Id::random);
        Ok((Content { id, stage_id, kind }, true))
    }

    /// Resolve a content request, registering new content.
    pub fn ensure_content(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        request: &ContentRequest,
    ) -> Result<(Content, bool), StateError> {
        let (content, created) = self.prepare_content(stage_id, content_id, request)?;
        if created {
            self.registry.add_content(content.clone())?;
        }
        Ok((content, created))
    }

    /// Check that metadata may be attached to content.
    pub fn content_addition(&self, content_id: Id) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.content(content_id).ok_or(StateError::UnknownReference(content_id))?;
        Ok(())
    }

    /// Record the single function call payload of content.
    pub fn function_call(&mut self, content_id: Id) -> Result<(), StateError> {
        self.single_shot(content_id, ContentType::FunctionCall)
    }

    /// Record a single-shot text payload of content.
    pub fn text(&mut self, content_id: Id) -> Result<(), StateError> {
        self.single_shot(content_id, ContentType::Text)
    }

    fn single_shot(&mut self, content_id: Id, expected: ContentType) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.expect_kind(content_id, |actual| actual == expected, expected)?;
        self.registry.mark_has_data(content_id)
    }

    /// Open a stream for content.
    pub fn open_stream(&mut self, content_id: Id) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.open_stream(content_id)
    }

    /// Close a stream.
    pub fn close_stream(&mut self, content_id: Id) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.close_stream(content_id)
    }

    /// Check that a text chunk may be sent on an open stream.
    pub fn check_text_chunk(&self, content_id: Id) -> Result<(), StateError> {
        self.check_chunk(content_id, |actual| actual == ContentType::Text, ContentType::Text)
    }

    /// Check that a media chunk may be sent on an open stream.
    pub fn check_media_chunk(&self, content_id: Id) -> Result<(), StateError> {
        self.check_chunk(content_id, ContentType::is_media, ContentType::Audio)
    }

    fn check_chunk(
        &self,
        content_id: Id,
        accepts: impl Fn(ContentType) -> bool,
        expected: ContentType,
    ) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.expect_kind(content_id, accepts, expected)?;
        if !self.registry.is_open(content_id) {
            return Err(StateError::StreamNotOpen(content_id));
        }
        Ok(())
    }

    fn expect_kind(
        &self,
        content_id: Id,
        accepts: impl Fn(ContentType) -> bool,
        expected: ContentType,
    ) -> Result<(), StateError> {
        let content =
            self.registry.content(content_id).ok_or(StateError::UnknownReference(content_id))?;
        let actual = content.kind.content_type();
        if !accepts(actual) {
            return Err(StateError::ContentKindMismatch { id: content_id, expected, actual });
        }
        Ok(())
    }

    /// End output once every content has its data and no stream is open.
    pub fn end_output(&mut self) -> Result<(), StateError> {
        self.request.ensure_output_open()?;
        self.registry.check_complete()?;
        self.request.end_output()
    }

    /// Accept a text input message from the client.
    pub fn receive_text_input(&mut self) -> Result<(), StateError> {
        self.request.ensure_input_open()?;
        self.request.ensure_input_mode(InputMode::Text)?;
        if self.text_received {
            return Err(StateError::TextAlreadySent);
        }
        self.text_received = true;
        Ok(())
    }

    /// Accept a media input chunk from the client.
    pub fn receive_media_input(&self) -> Result<(), StateError> {
        self.request.ensure_input_open()?;
        self.request.ensure_input_mode(InputMode::Audio)
    }
}
