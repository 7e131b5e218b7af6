//! Transport abstraction.
//!
//! The façades hand encoded frames to a [`Transport`] once an operation has
//! been validated. Sending never blocks: a transport that wants to expose
//! delivery (or backpressure) returns a [`Completion`] the caller may await,
//! or drop.
//!
//! Inbound frames flow the other way. Whatever drives the transport calls
//! [`FrameSink::receive`] for every frame, in the order received.

use std::{
    error::Error,
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::future::{self, BoxFuture, FutureExt};
use stagewire_proto::{Event, WireFrame};
use thiserror::Error;

/// Application callback invoked with every validated inbound event.
pub type EventCallback = Box<dyn FnMut(&Event) + Send>;

/// Opaque failure reported by a transport.
#[derive(Debug, Error)]
#[error("transport failed: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl TransportError {
    /// Wrap a transport-specific error.
    pub fn new(source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self { source: source.into() }
    }
}

/// Token resolving when the transport has finished with a frame.
///
/// Awaiting it is optional; dropping it does not cancel the send.
#[must_use = "completions report transport failures when awaited"]
pub struct Completion {
    inner: BoxFuture<'static, Result<(), TransportError>>,
}

impl Completion {
    /// Wrap a future as a completion token.
    pub fn new(future: impl Future<Output = Result<(), TransportError>> + Send + 'static) -> Self {
        Self { inner: future.boxed() }
    }

    /// A completion that has already succeeded.
    pub fn ready() -> Self {
        Self::new(future::ready(Ok(())))
    }

    /// Await every present completion in order, stopping at the first error.
    pub async fn join(
        completions: impl IntoIterator<Item = Option<Self>>,
    ) -> Result<(), TransportError> {
        for completion in completions.into_iter().flatten() {
            completion.await?;
        }
        Ok(())
    }
}

impl Future for Completion {
    type Output = Result<(), TransportError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

/// An event that was validated and handed to the transport.
#[derive(Debug)]
pub struct Sent {
    /// The event as sent
    pub event: Event,
    /// Delivery token, if the transport provides one
    pub completion: Option<Completion>,
}

/// Outbound half of a connection.
///
/// Implementations must preserve the order of frames on each channel.
pub trait Transport {
    /// Send a JSON text frame.
    fn send_text(&mut self, text: String) -> Result<Option<Completion>, TransportError>;

    /// Send a binary media frame.
    fn send_bytes(&mut self, bytes: Bytes) -> Result<Option<Completion>, TransportError>;

    /// Send a frame on the channel it belongs to.
    fn send_frame(&mut self, frame: WireFrame) -> Result<Option<Completion>, TransportError> {
        match frame {
            WireFrame::Text(text) => self.send_text(text),
            WireFrame::Binary(bytes) => self.send_bytes(bytes),
        }
    }
}

/// Receiver of inbound frames.
pub trait FrameSink {
    /// Error returned for frames that fail to decode or validate.
    type Error;

    /// Decode, validate and dispatch one inbound frame.
    ///
    /// Returns the event passed to the application callback.
    fn receive(&mut self, frame: WireFrame) -> Result<Event, Self::Error>;
}
