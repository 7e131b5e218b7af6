//! Stagewire protocol client
//!
//! Client side of a Stagewire session. The [`Client`] sends configuration and
//! input, and validates everything the server sends back against a mirror of
//! the server's output registry before the application callback sees it.
//!
//! # Input Flow
//!
//! ```text
//! Config ──> (Ready) ──> InputText            ──> InputEnd ──> (output) ──> (OutputEnd)
//!                    └─> InputMedia chunks ───┘
//! ```
//!
//! After `OutputEnd` the client resets for the next request in the
//! multi-request model, or ends the session in the single-request model.
//! After an interrupt the application calls [`Client::reset`] before sending
//! new input.

mod client;
mod error;

pub use client::{Client, ClientOptions};
pub use error::ClientError;
pub use stagewire_core::{
    Completion, EventCallback, FrameSink, Sent, SessionModel, StreamHandle, StreamSink, Transport,
    TransportError,
};
