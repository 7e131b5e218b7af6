//! Server façade.

use bytes::Bytes;
use serde_json::{Map, Value};
use stagewire_core::{
    AudioParams, Completion, ContentRequest, EventCallback, FrameSink, Sent, ServerState,
    SessionModel, StateError, StreamHandle, StreamSink, Transport, VideoParams,
};
use stagewire_proto::{
    Config, Content, ContentAddition, Direction, Event, Id, Interrupt, InterruptType,
    OutputFunctionCall, OutputMedia, OutputText, Ready, Segment, Stage, Transcription, WireFrame,
    decode, encode,
};
use tracing::{debug, warn};

use crate::ServerError;

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// What happens after output ends
    pub session_model: SessionModel,
}

/// Server side of one session.
///
/// Output operations validate against the request state, encode the event,
/// and hand the frame to the transport. A rejected operation sends nothing
/// and changes nothing.
pub struct Server<T> {
    transport: T,
    state: ServerState,
    options: ServerOptions,
    callback: EventCallback,
    chat_id: Option<Id>,
    request_id: Option<Id>,
}

impl<T: Transport> Server<T> {
    /// Create a server for one session.
    ///
    /// `callback` receives every validated client event, after the server has
    /// applied its own transitions (a `Config` is answered with `Ready` before
    /// the callback runs).
    pub fn new(transport: T, options: ServerOptions, callback: EventCallback) -> Self {
        Self {
            transport,
            state: ServerState::new(),
            options,
            callback,
            chat_id: None,
            request_id: None,
        }
    }

    /// Request state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Server configuration
    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Chat id announced in `Ready`
    pub fn chat_id(&self) -> Option<Id> {
        self.chat_id
    }

    /// Request id announced in `Ready`
    pub fn request_id(&self) -> Option<Id> {
        self.request_id
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn send(&mut self, event: Event, frame: WireFrame) -> Result<Sent, ServerError> {
        let completion = self.transport.send_frame(frame)?;
        debug!(
            event_type = ?event.event_type(),
            content_id = ?event.content_id(),
            "sent"
        );
        Ok(Sent { event, completion })
    }

    /// Encode, commit the state change, then send.
    fn emit(
        &mut self,
        event: Event,
        commit: impl FnOnce(&mut ServerState) -> Result<(), StateError>,
    ) -> Result<Sent, ServerError> {
        let frame = encode(&event)?;
        commit(&mut self.state)?;
        self.send(event, frame)
    }

    /// Accept the client configuration and send `Ready`.
    ///
    /// A chat id is generated when the config carries none, and a request id
    /// when none is given.
    pub fn ready(&mut self, config: Config, request_id: Option<Id>) -> Result<Sent, ServerError> {
        let chat_id = config.chat_id.unwrap_or_else(Id::random);
        let request_id = request_id.unwrap_or_else(Id::random);
        let config = Config { chat_id: Some(chat_id), ..config };

        let event = Event::Ready(Ready { chat_id, request_id });
        let frame = encode(&event)?;
        self.state.ready(config)?;
        self.chat_id = Some(chat_id);
        self.request_id = Some(request_id);

        self.send(event, frame)
    }

    /// Send a transcription of the client's audio input.
    pub fn transcription(&mut self, segments: Vec<Segment>) -> Result<Sent, ServerError> {
        self.emit(Event::Transcription(Transcription { segments }), |state| state.transcription())
    }

    /// Declare a stage, generating its id when none is given.
    pub fn stage(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        id: Option<Id>,
        parent_id: Option<Id>,
    ) -> Result<Sent, ServerError> {
        let stage = Stage {
            id: id.unwrap_or_else(Id::random),
            parent_id,
            title: title.into(),
            description: description.into(),
        };
        self.emit(Event::Stage(stage.clone()), |state| state.add_stage(&stage))
    }

    /// Resolve content, declaring it first if it does not exist yet.
    ///
    /// Returns the content and the `Content` event if one was sent.
    pub fn ensure_content(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        request: ContentRequest,
    ) -> Result<(Content, Option<Sent>), ServerError> {
        let (content, created) = self.state.prepare_content(stage_id, content_id, &request)?;
        if !created {
            return Ok((content, None));
        }

        let sent = self.emit(Event::Content(content.clone()), |state| state.add_content(&content))?;
        Ok((content, Some(sent)))
    }

    /// Resolve or declare text content.
    pub fn text_content(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
    ) -> Result<(Content, Option<Sent>), ServerError> {
        self.ensure_content(stage_id, content_id, ContentRequest::Text)
    }

    /// Resolve or declare function call content.
    pub fn function_call_content(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
    ) -> Result<(Content, Option<Sent>), ServerError> {
        self.ensure_content(stage_id, content_id, ContentRequest::FunctionCall)
    }

    /// Resolve or declare audio content.
    pub fn audio_content(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        params: AudioParams,
    ) -> Result<(Content, Option<Sent>), ServerError> {
        self.ensure_content(stage_id, content_id, ContentRequest::Audio(params))
    }

    /// Resolve or declare video content.
    pub fn video_content(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        params: VideoParams,
    ) -> Result<(Content, Option<Sent>), ServerError> {
        self.ensure_content(stage_id, content_id, ContentRequest::Video(params))
    }

    /// Attach metadata to existing content.
    pub fn content_addition(
        &mut self,
        content_id: Id,
        metadata: Map<String, Value>,
    ) -> Result<Sent, ServerError> {
        self.emit(Event::ContentAddition(ContentAddition { content_id, metadata }), |state| {
            state.content_addition(content_id)
        })
    }

    /// Send a function call as the single payload of its content.
    ///
    /// Returns the `Content` event if the content was declared here, and the
    /// call itself.
    pub fn function_call(
        &mut self,
        data: impl Into<String>,
        stage_id: Option<Id>,
        content_id: Option<Id>,
    ) -> Result<(Option<Sent>, Sent), ServerError> {
        let (content, announced) = self.function_call_content(stage_id, content_id)?;
        let id = content.id;
        let event = Event::OutputFunctionCall(OutputFunctionCall { content_id: id, data: data.into() });
        let sent = self.emit(event, |state| state.function_call(id))?;
        Ok((announced, sent))
    }

    /// Send text as the single payload of its content.
    pub fn text(
        &mut self,
        data: impl Into<String>,
        stage_id: Option<Id>,
        content_id: Option<Id>,
    ) -> Result<(Option<Sent>, Sent), ServerError> {
        let (content, announced) = self.text_content(stage_id, content_id)?;
        let id = content.id;
        let event = Event::OutputText(OutputText { content_id: id, data: data.into() });
        let sent = self.emit(event, |state| state.text(id))?;
        Ok((announced, sent))
    }

    fn open_stream<C>(
        &mut self,
        content: &Content,
        announced: Option<Sent>,
    ) -> Result<(StreamHandle<C>, Option<Sent>), ServerError> {
        self.state.open_stream(content.id)?;
        debug!(content_id = %content.id, content_type = ?content.kind.content_type(), "stream opened");
        Ok((StreamHandle::new(Some(content.id)), announced))
    }

    /// Open a text stream, declaring its content if needed.
    pub fn text_stream(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
    ) -> Result<(StreamHandle<String>, Option<Sent>), ServerError> {
        let (content, announced) = self.text_content(stage_id, content_id)?;
        self.open_stream(&content, announced)
    }

    /// Open an audio stream, declaring its content if needed.
    pub fn audio_stream(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        params: AudioParams,
    ) -> Result<(StreamHandle<Bytes>, Option<Sent>), ServerError> {
        let (content, announced) = self.audio_content(stage_id, content_id, params)?;
        self.open_stream(&content, announced)
    }

    /// Open a video stream, declaring its content if needed.
    pub fn video_stream(
        &mut self,
        stage_id: Option<Id>,
        content_id: Option<Id>,
        params: VideoParams,
    ) -> Result<(StreamHandle<Bytes>, Option<Sent>), ServerError> {
        let (content, announced) = self.video_content(stage_id, content_id, params)?;
        self.open_stream(&content, announced)
    }

    /// End output of the current request.
    ///
    /// Sends `OutputEnd`, then resets for the next request, or ends the
    /// session and sends `SessionEnd` in the single-request model.
    pub fn end(&mut self) -> Result<Vec<Sent>, ServerError> {
        let mut sent = vec![self.emit(Event::OutputEnd, ServerState::end_output)?];

        if self.options.session_model.continues() {
            self.state.reset()?;
        } else {
            sent.push(self.emit(Event::SessionEnd, ServerState::end_session)?);
        }
        Ok(sent)
    }

    /// End the session.
    pub fn end_session(&mut self) -> Result<Sent, ServerError> {
        self.emit(Event::SessionEnd, ServerState::end_session)
    }

    /// Interrupt the current request.
    ///
    /// All stage, content and stream bookkeeping is dropped. In the
    /// multi-request model the next client input starts a fresh request.
    pub fn interrupt(&mut self, interrupt_type: InterruptType) -> Result<Sent, ServerError> {
        self.emit(Event::Interrupt(Interrupt { interrupt_type }), ServerState::interrupt)
    }

    /// End input on the client's behalf, e.g. once silence is detected.
    ///
    /// Sends `InputEnd`; the client treats it as an acknowledgment.
    pub fn end_input(&mut self) -> Result<Sent, ServerError> {
        self.emit(Event::InputEnd, ServerState::end_input)
    }

    /// Apply inbound input.
    ///
    /// After an interrupt in the multi-request model, input starts a fresh
    /// request. The reset is committed only if `accept` passes on it.
    fn accept_input(
        &mut self,
        accept: impl FnOnce(&mut ServerState) -> Result<(), StateError>,
    ) -> Result<(), StateError> {
        if !(self.options.session_model.continues() && self.state.request().is_interrupted()) {
            return accept(&mut self.state);
        }

        let mut next = self.state.clone();
        next.reset()?;
        accept(&mut next)?;
        debug!("input after interrupt starts a new request");
        self.state = next;
        Ok(())
    }

    /// Apply an inbound event and pass it to the application callback.
    ///
    /// Returns the event on success.
    pub fn on_event(&mut self, event: Event) -> Result<Event, ServerError> {
        match &event {
            Event::Config(config) => {
                self.ready(config.clone(), None)?;
            },
            Event::InputText(_) => self.accept_input(ServerState::receive_text_input)?,
            Event::InputMedia(_) => self.accept_input(|state| state.receive_media_input())?,
            Event::InputEnd => self.accept_input(ServerState::end_input)?,
            // Interrupts and session ends may cross on the wire
            Event::Interrupt(_) => {
                if !self.state.request().is_interrupted() {
                    self.state.interrupt()?;
                }
            },
            Event::SessionEnd => {
                if !self.state.request().session_ended() {
                    self.state.end_session()?;
                }
            },
            other => return Err(ServerError::UnexpectedEvent(other.event_type())),
        }

        debug!(event_type = ?event.event_type(), "received");
        (self.callback)(&event);
        Ok(event)
    }

    /// Decode an inbound frame and dispatch it.
    pub fn receive(&mut self, frame: WireFrame) -> Result<Event, ServerError> {
        let result = decode(Direction::ClientToServer, frame)
            .map_err(ServerError::from)
            .and_then(|event| self.on_event(event));

        if let Err(err) = &result {
            warn!(error = %err, "rejected inbound frame");
        }
        result
    }
}

impl<T: Transport> FrameSink for Server<T> {
    type Error = ServerError;

    fn receive(&mut self, frame: WireFrame) -> Result<Event, ServerError> {
        Self::receive(self, frame)
    }
}

impl<T: Transport> StreamSink<String> for Server<T> {
    type Error = ServerError;

    fn send_chunk(&mut self, content_id: Option<Id>, chunk: String) -> Result<Sent, ServerError> {
        let content_id = content_id.ok_or(StateError::MissingRequiredParameters("content_id"))?;
        self.emit(Event::OutputText(OutputText { content_id, data: chunk }), |state| {
            state.check_text_chunk(content_id)
        })
    }

    fn finish_stream(&mut self, content_id: Option<Id>) -> Result<Option<Completion>, ServerError> {
        let content_id = content_id.ok_or(StateError::MissingRequiredParameters("content_id"))?;
        self.state.close_stream(content_id)?;
        debug!(%content_id, "stream closed");
        Ok(None)
    }
}

impl<T: Transport> StreamSink<Bytes> for Server<T> {
    type Error = ServerError;

    fn send_chunk(&mut self, content_id: Option<Id>, chunk: Bytes) -> Result<Sent, ServerError> {
        let content_id = content_id.ok_or(StateError::MissingRequiredParameters("content_id"))?;
        self.emit(Event::OutputMedia(OutputMedia { content_id, data: chunk }), |state| {
            state.check_media_chunk(content_id)
        })
    }

    fn finish_stream(&mut self, content_id: Option<Id>) -> Result<Option<Completion>, ServerError> {
        let content_id = content_id.ok_or(StateError::MissingRequiredParameters("content_id"))?;
        self.state.close_stream(content_id)?;
        debug!(%content_id, "stream closed");
        Ok(None)
    }
}
