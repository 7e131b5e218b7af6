//! Client façade.

use bytes::Bytes;
use stagewire_core::{
    ClientState, Completion, EventCallback, FrameSink, Sent, SessionModel, StateError,
    StreamHandle, StreamSink, Transport,
};
use stagewire_proto::{
    Config, Direction, Event, Id, InputMedia, InputText, Interrupt, InterruptType, WireFrame,
    decode, encode,
};
use tracing::{debug, warn};

use crate::ClientError;

/// Client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Session configuration sent to the server
    pub config: Config,
    /// What happens after output ends
    pub session_model: SessionModel,
}

/// Client side of one session.
pub struct Client<T> {
    transport: T,
    state: ClientState,
    options: ClientOptions,
    callback: EventCallback,
    chat_id: Option<Id>,
    request_id: Option<Id>,
}

impl<T: Transport> Client<T> {
    /// Create a client for one session.
    ///
    /// Nothing is sent until [`send_config`](Self::send_config).
    pub fn new(transport: T, options: ClientOptions, callback: EventCallback) -> Self {
        let chat_id = options.config.chat_id;
        Self {
            transport,
            state: ClientState::new(),
            options,
            callback,
            chat_id,
            request_id: None,
        }
    }

    /// Request state
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Client configuration
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Chat id, as configured or assigned by the server
    pub fn chat_id(&self) -> Option<Id> {
        self.chat_id
    }

    /// Request id assigned by the server
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

    fn emit(
        &mut self,
        event: Event,
        commit: impl FnOnce(&mut ClientState) -> Result<(), StateError>,
    ) -> Result<Sent, ClientError> {
        let frame = encode(&event)?;
        commit(&mut self.state)?;
        let completion = self.transport.send_frame(frame)?;
        debug!(event_type = ?event.event_type(), "sent");
        Ok(Sent { event, completion })
    }

    /// Send the session configuration. Once per session.
    pub fn send_config(&mut self) -> Result<Sent, ClientError> {
        let config = Config { chat_id: self.chat_id, ..self.options.config.clone() };
        self.emit(Event::Config(config), ClientState::send_config)
    }

    /// Send the request's text input.
    pub fn send_text(&mut self, data: impl Into<String>) -> Result<Sent, ClientError> {
        self.emit(Event::InputText(InputText { data: data.into() }), ClientState::send_text)
    }

    /// Send one chunk of audio input.
    ///
    /// Empty chunks cannot be framed and are rejected by the codec.
    pub fn send_media(&mut self, data: Bytes) -> Result<Sent, ClientError> {
        self.emit(Event::InputMedia(InputMedia { data }), |state| state.check_media())
    }

    /// Start streaming audio input. Ending the stream ends input.
    pub fn media_stream(&self) -> Result<StreamHandle<Bytes>, ClientError> {
        self.state.check_media()?;
        Ok(StreamHandle::new(None))
    }

    /// End input for the current request.
    pub fn end_input(&mut self) -> Result<Sent, ClientError> {
        self.emit(Event::InputEnd, ClientState::end_input)
    }

    /// Interrupt the current request.
    pub fn interrupt(&mut self, interrupt_type: InterruptType) -> Result<Sent, ClientError> {
        self.emit(Event::Interrupt(Interrupt { interrupt_type }), ClientState::interrupt)
    }

    /// End the session.
    pub fn end_session(&mut self) -> Result<Sent, ClientError> {
        self.emit(Event::SessionEnd, ClientState::end_session)
    }

    /// Start the next request. Local only; nothing is sent.
    pub fn reset(&mut self) -> Result<(), ClientError> {
        self.state.reset()?;
        Ok(())
    }

    fn finish_request(&mut self) -> Result<(), StateError> {
        if self.options.session_model.continues() {
            self.state.reset()
        } else {
            self.state.end_session()
        }
    }

    /// Apply an inbound event and pass it to the application callback.
    pub fn on_event(&mut self, event: Event) -> Result<Event, ClientError> {
        match &event {
            Event::Ready(ready) => {
                let config = Config { chat_id: Some(ready.chat_id), ..self.options.config.clone() };
                self.state.ready(config)?;
                self.chat_id = Some(ready.chat_id);
                self.request_id = Some(ready.request_id);
            },
            Event::Transcription(_) => self.state.observe_transcription()?,
            Event::Stage(stage) => self.state.observe_stage(stage)?,
            Event::Content(content) => self.state.observe_content(content)?,
            Event::ContentAddition(addition) => {
                self.state.observe_content_addition(addition.content_id)?;
            },
            Event::OutputText(text) => self.state.observe_text(text.content_id)?,
            Event::OutputMedia(media) => self.state.observe_media(media.content_id)?,
            Event::OutputFunctionCall(call) => self.state.observe_function_call(call.content_id)?,
            Event::InputEnd => self.state.observe_input_end()?,
            Event::OutputEnd => {
                self.state.observe_output_end()?;
                self.finish_request()?;
            },
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
            Event::Config(_) | Event::InputText(_) | Event::InputMedia(_) => {
                return Err(ClientError::UnexpectedEvent(event.event_type()));
            },
        }

        debug!(event_type = ?event.event_type(), content_id = ?event.content_id(), "received");
        (self.callback)(&event);
        Ok(event)
    }

    /// Decode an inbound frame and dispatch it.
    pub fn receive(&mut self, frame: WireFrame) -> Result<Event, ClientError> {
        let result = decode(Direction::ServerToClient, frame)
            .map_err(ClientError::from)
            .and_then(|event| self.on_event(event));

        if let Err(err) = &result {
            warn!(error = %err, "rejected inbound frame");
        }
        result
    }
}

impl<T: Transport> FrameSink for Client<T> {
    type Error = ClientError;

    fn receive(&mut self, frame: WireFrame) -> Result<Event, ClientError> {
        Self::receive(self, frame)
    }
}

impl<T: Transport> StreamSink<Bytes> for Client<T> {
    type Error = ClientError;

    fn send_chunk(&mut self, _: Option<Id>, chunk: Bytes) -> Result<Sent, ClientError> {
        self.send_media(chunk)
    }

    fn finish_stream(&mut self, _: Option<Id>) -> Result<Option<Completion>, ClientError> {
        Ok(self.end_input()?.completion)
    }
}

#[cfg(test)]
mod tests {
    use stagewire_core::TransportError;
    use stagewire_proto::{
        CodecError, Content, ContentKind, EventType, OutputText, Ready, Stage, decode_text,
    };

    use super::*;

    #[derive(Default)]
    struct Capture {
        frames: Vec<WireFrame>,
    }

    impl Transport for Capture {
        fn send_text(&mut self, text: String) -> Result<Option<Completion>, TransportError> {
            self.frames.push(WireFrame::Text(text));
            Ok(None)
        }

        fn send_bytes(&mut self, bytes: Bytes) -> Result<Option<Completion>, TransportError> {
            self.frames.push(WireFrame::Binary(bytes));
            Ok(Some(Completion::ready()))
        }
    }

    fn id(n: u128) -> Id {
        Id::from_u128(n)
    }

    fn client(config: Config) -> Client<Capture> {
        let options = ClientOptions { config, session_model: SessionModel::MultiRequest };
        Client::new(Capture::default(), options, Box::new(|_: &Event| {}))
    }

    fn ready_client(config: Config) -> Client<Capture> {
        let mut client = client(config);
        client.send_config().unwrap();
        client.on_event(Event::Ready(Ready { chat_id: id(1), request_id: id(2) })).unwrap();
        client
    }

    #[test]
    fn config_goes_out_once() {
        let mut client = client(Config::default());
        client.send_config().unwrap();
        assert!(matches!(
            client.send_config(),
            Err(ClientError::State(StateError::ConfigAlreadySent))
        ));

        let WireFrame::Text(text) = &client.transport().frames[0] else { panic!("expected text") };
        assert_eq!(decode_text(text).unwrap().event_type(), EventType::Config);
    }

    #[test]
    fn ready_assigns_ids() {
        let client = ready_client(Config::default());
        assert_eq!(client.chat_id(), Some(id(1)));
        assert_eq!(client.request_id(), Some(id(2)));
        assert_eq!(client.state().request().config().unwrap().chat_id, Some(id(1)));
    }

    #[test]
    fn second_text_rejected() {
        let mut client = ready_client(Config::default());
        client.send_text("Hello").unwrap();
        assert!(matches!(
            client.send_text("Hello again"),
            Err(ClientError::State(StateError::TextAlreadySent))
        ));
        assert_eq!(client.transport().frames.len(), 2);
    }

    #[test]
    fn media_stream_end_ends_input() {
        let mut client = ready_client(Config::audio());
        let stream = client.media_stream().unwrap();

        let sent = stream.send(&mut client, Bytes::from_static(b"pcm")).unwrap();
        assert!(sent.completion.is_some());
        stream.end(&mut client).unwrap();

        assert!(client.state().request().input_ended());
        assert!(matches!(client.transport().frames[2], WireFrame::Binary(_)));
    }

    #[test]
    fn empty_media_chunk_rejected() {
        let mut client = ready_client(Config::audio());
        assert!(matches!(
            client.send_media(Bytes::new()),
            Err(ClientError::Codec(CodecError::EmptyFrame))
        ));
    }

    #[test]
    fn output_for_unknown_content_rejected() {
        let mut client = ready_client(Config::default());
        client.send_text("Hi").unwrap();
        client.end_input().unwrap();

        let chunk = Event::OutputText(OutputText { content_id: id(10), data: "x".into() });
        assert!(matches!(
            client.on_event(chunk),
            Err(ClientError::State(StateError::UnknownReference(_)))
        ));
    }

    #[test]
    fn output_end_resets_for_next_request() {
        let mut client = ready_client(Config::default());
        client.send_text("Hi").unwrap();
        client.end_input().unwrap();

        let stage = Stage { id: id(5), parent_id: None, title: "A".into(), description: String::new() };
        client.on_event(Event::Stage(stage)).unwrap();
        client
            .on_event(Event::Content(Content { id: id(6), stage_id: id(5), kind: ContentKind::Text }))
            .unwrap();
        client.on_event(Event::OutputText(OutputText { content_id: id(6), data: "Hey".into() })).unwrap();
        client.on_event(Event::OutputEnd).unwrap();

        assert!(!client.state().request().input_ended());
        client.send_text("Next").unwrap();
    }

    #[test]
    fn single_request_output_end_ends_session() {
        let mut client = client(Config::default());
        client.options.session_model = SessionModel::SingleRequest;
        client.send_config().unwrap();
        client.on_event(Event::Ready(Ready { chat_id: id(1), request_id: id(2) })).unwrap();
        client.send_text("Hi").unwrap();
        client.end_input().unwrap();

        client.on_event(Event::OutputEnd).unwrap();
        assert!(client.state().request().session_ended());

        // The server's trailing SessionEnd crosses with ours
        client.on_event(Event::SessionEnd).unwrap();
    }

    #[test]
    fn client_events_rejected_inbound() {
        let mut client = ready_client(Config::default());
        assert!(matches!(
            client.on_event(Event::InputText(InputText { data: "echo".into() })),
            Err(ClientError::UnexpectedEvent(EventType::InputText))
        ));
    }
}
