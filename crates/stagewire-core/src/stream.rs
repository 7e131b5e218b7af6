//! Streaming handles.
//!
//! A [`StreamHandle`] is the single owner of one open stream. Chunks are sent
//! through it and [`StreamHandle::end`] consumes it, so a chunk after the end
//! of a stream does not compile. The handle itself holds no state; every
//! chunk is still validated by the sink it is sent through.

use std::{fmt, marker::PhantomData};

use stagewire_proto::Id;

use crate::{Completion, Sent};

/// Something that can carry chunks of type `C` for a stream.
pub trait StreamSink<C> {
    /// Error for rejected chunks.
    type Error;

    /// Validate and send one chunk.
    fn send_chunk(&mut self, content_id: Option<Id>, chunk: C) -> Result<Sent, Self::Error>;

    /// Close the stream.
    fn finish_stream(&mut self, content_id: Option<Id>) -> Result<Option<Completion>, Self::Error>;
}

/// Handle to an open stream carrying chunks of type `C`.
///
/// Bound to one content id; the client's input media stream has none.
#[must_use = "streams must be ended"]
pub struct StreamHandle<C> {
    content_id: Option<Id>,
    _chunk: PhantomData<fn(C)>,
}

impl<C> StreamHandle<C> {
    /// Bind a handle to a stream the sink has already opened.
    pub fn new(content_id: Option<Id>) -> Self {
        Self { content_id, _chunk: PhantomData }
    }

    /// Content the stream feeds.
    pub fn content_id(&self) -> Option<Id> {
        self.content_id
    }

    /// Send one chunk.
    pub fn send<S: StreamSink<C>>(&self, sink: &mut S, chunk: C) -> Result<Sent, S::Error> {
        sink.send_chunk(self.content_id, chunk)
    }

    /// End the stream.
    pub fn end<S: StreamSink<C>>(self, sink: &mut S) -> Result<Option<Completion>, S::Error> {
        sink.finish_stream(self.content_id)
    }
}

impl<C> fmt::Debug for StreamHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle").field("content_id", &self.content_id).finish()
    }
}

#[cfg(test)]
mod tests {
    use stagewire_proto::{Event, OutputText};

    use super::*;

    /// Records chunks; rejects anything after the stream closed.
    #[derive(Default)]
    struct Recorder {
        chunks: Vec<String>,
        closed: bool,
    }

    impl StreamSink<String> for Recorder {
        type Error = &'static str;

        fn send_chunk(&mut self, content_id: Option<Id>, chunk: String) -> Result<Sent, Self::Error> {
            if self.closed {
                return Err("closed");
            }
            let content_id = content_id.ok_or("no content")?;
            self.chunks.push(chunk.clone());
            Ok(Sent { event: Event::OutputText(OutputText { content_id, data: chunk }), completion: None })
        }

        fn finish_stream(&mut self, _: Option<Id>) -> Result<Option<Completion>, Self::Error> {
            self.closed = true;
            Ok(None)
        }
    }

    #[test]
    fn handle_forwards_chunks_then_ends() {
        let mut sink = Recorder::default();
        let handle = StreamHandle::<String>::new(Some(Id::from_u128(10)));

        let sent = handle.send(&mut sink, "Hel".into()).unwrap();
        assert_eq!(sent.event.content_id(), Some(Id::from_u128(10)));
        handle.send(&mut sink, "lo".into()).unwrap();
        assert!(handle.end(&mut sink).unwrap().is_none());

        assert_eq!(sink.chunks, vec!["Hel", "lo"]);
        assert!(sink.closed);
    }
}
