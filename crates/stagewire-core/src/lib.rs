//! Stagewire protocol core logic
//!
//! Pure validation logic for the Stagewire protocol, decoupled from I/O. The
//! client and server façades consult these state machines before every send
//! and after every receive; nothing in this crate touches a socket or a
//! runtime.
//!
//! # Architecture
//!
//! Each request is tracked by a state machine that either accepts an
//! operation and records its effect, or rejects it with a [`StateError`] and
//! leaves every field untouched. The façades build the event, consult the
//! state machine, and only then hand the frame to a [`Transport`].
//!
//! Sending is fire-and-forget from the core's point of view. A transport may
//! return a [`Completion`] token the caller can await for backpressure, but no
//! operation here ever blocks or awaits.
//!
//! # Components
//!
//! - [`state`]: Request state machines (base, client, server)
//! - [`registry`]: Stage forest, content set and stream bookkeeping
//! - [`hierarchy`]: Cycle detection over parent links
//! - [`session`]: Session models (multi- or single-request)
//! - [`content`]: Content creation requests with optional kind parameters
//! - [`stream`]: Streaming handles
//! - [`transport`]: Transport contract and completion tokens
//! - [`error`]: State error types

pub mod content;
pub mod error;
pub mod hierarchy;
pub mod registry;
pub mod session;
pub mod state;
pub mod stream;
pub mod transport;

pub use content::{AudioParams, ContentRequest, VideoParams};
pub use error::StateError;
pub use hierarchy::detect_cycle;
pub use registry::OutputRegistry;
pub use session::SessionModel;
pub use state::{ClientState, Phase, RequestState, ServerState};
pub use stream::{StreamHandle, StreamSink};
pub use transport::{Completion, EventCallback, FrameSink, Sent, Transport, TransportError};
