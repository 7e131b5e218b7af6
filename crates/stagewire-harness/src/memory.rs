//! In-memory frame transport.

use bytes::Bytes;
use stagewire_core::{Completion, FrameSink, Transport, TransportError};
use stagewire_proto::WireFrame;
use tokio::sync::{mpsc, oneshot};

use crate::HarnessError;

/// A frame in flight, with the sender's delivery acknowledgment.
#[derive(Debug)]
pub struct Delivery {
    /// The queued frame
    pub frame: WireFrame,
    ack: Option<oneshot::Sender<Result<(), TransportError>>>,
}

impl Delivery {
    /// Resolve the sender's completion, if it asked for one.
    pub fn acknowledge(self) -> WireFrame {
        if let Some(ack) = self.ack {
            // Sender may have dropped its completion
            let _ = ack.send(Ok(()));
        }
        self.frame
    }
}

/// Sending half of an in-memory channel.
///
/// With acknowledgments enabled every send returns a [`Completion`] that
/// resolves once the receiving [`MemoryInbox`] hands the frame over.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    tx: mpsc::UnboundedSender<Delivery>,
    acked: bool,
}

impl MemoryTransport {
    fn push(&self, frame: WireFrame) -> Result<Option<Completion>, TransportError> {
        let (ack, completion) = if self.acked {
            let (tx, rx) = oneshot::channel();
            let completion = Completion::new(async move {
                rx.await.unwrap_or_else(|_| Err(TransportError::new(HarnessError::Disconnected)))
            });
            (Some(tx), Some(completion))
        } else {
            (None, None)
        };

        self.tx
            .send(Delivery { frame, ack })
            .map_err(|_| TransportError::new(HarnessError::Disconnected))?;
        Ok(completion)
    }
}

impl Transport for MemoryTransport {
    fn send_text(&mut self, text: String) -> Result<Option<Completion>, TransportError> {
        self.push(WireFrame::Text(text))
    }

    fn send_bytes(&mut self, bytes: Bytes) -> Result<Option<Completion>, TransportError> {
        self.push(WireFrame::Binary(bytes))
    }
}

/// Receiving half of an in-memory channel.
#[derive(Debug)]
pub struct MemoryInbox {
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl MemoryInbox {
    /// Take the next queued frame without waiting.
    pub fn try_next(&mut self) -> Option<WireFrame> {
        self.rx.try_recv().ok().map(Delivery::acknowledge)
    }

    /// Wait for the next frame; `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<WireFrame> {
        self.rx.recv().await.map(Delivery::acknowledge)
    }

    /// Number of frames waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Deliver every queued frame to `sink`, stopping at the first rejection.
    ///
    /// Returns how many frames were accepted.
    pub fn pump<S: FrameSink>(&mut self, sink: &mut S) -> Result<usize, S::Error> {
        let mut delivered = 0;
        while let Some(frame) = self.try_next() {
            sink.receive(frame)?;
            delivered += 1;
        }
        Ok(delivered)
    }
}

/// Create a connected transport and inbox.
pub fn channel(acked: bool) -> (MemoryTransport, MemoryInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MemoryTransport { tx, acked }, MemoryInbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_arrive_in_order() {
        let (mut transport, mut inbox) = channel(false);
        assert!(transport.send_text("a".into()).unwrap().is_none());
        transport.send_bytes(Bytes::from_static(b"b")).unwrap();

        assert_eq!(inbox.pending(), 2);
        assert_eq!(inbox.try_next(), Some(WireFrame::Text("a".into())));
        assert_eq!(inbox.try_next(), Some(WireFrame::Binary(Bytes::from_static(b"b"))));
        assert_eq!(inbox.try_next(), None);
    }

    #[test]
    fn send_fails_once_inbox_dropped() {
        let (mut transport, inbox) = channel(false);
        drop(inbox);
        assert!(transport.send_text("lost".into()).is_err());
    }
}
