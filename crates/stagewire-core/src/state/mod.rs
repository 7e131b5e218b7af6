//! Request state machines.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────┐ ready ┌───────┐ end_input ┌────────────┐ end_output ┌─────────────┐
//! │ NotReady │──────>│ Ready │──────────>│ InputEnded │───────────>│ OutputEnded │
//! └──────────┘       └───────┘           └────────────┘            └─────────────┘
//!       │                │                     │                          │
//!       └────────────────┴──── interrupt ──────┴──────────────────────────┘
//!                                  ↓
//!                           ┌─────────────┐
//!                           │ Interrupted │
//!                           └─────────────┘
//! ```
//!
//! `reset` returns any live phase to `Ready` (or `NotReady` if the session
//! never became ready) for the next request. `end_session` moves any phase to
//! the terminal `SessionEnded`.
//!
//! [`RequestState`] holds the shared lifecycle. [`ClientState`] and
//! [`ServerState`] wrap it with the checks each role performs.

mod client;
mod request;
mod server;

pub use client::ClientState;
pub use request::{Phase, RequestState};
pub use server::ServerState;
