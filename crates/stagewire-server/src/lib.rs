//! Stagewire protocol server
//!
//! Server side of a Stagewire session. The [`Server`] owns the request state,
//! validates every output operation against it before handing frames to the
//! transport, and validates client input before it reaches the application
//! callback.
//!
//! # Output Flow
//!
//! ```text
//! Config ──> Ready ──> (input) ──> InputEnd
//!                                     │
//!                                     ▼
//!            Stage ─> Content ─> data (single-shot or stream) ─> ... ─> OutputEnd
//! ```
//!
//! Every content must receive its data before [`Server::end`] succeeds. In the
//! multi-request model the server then resets for the next request; in the
//! single-request model it also ends the session.

mod error;
mod server;

pub use error::ServerError;
pub use server::{Server, ServerOptions};
pub use stagewire_core::{
    AudioParams, Completion, ContentRequest, EventCallback, FrameSink, Sent, SessionModel,
    StreamHandle, StreamSink, Transport, TransportError, VideoParams,
};
