//! In-memory test harness for Stagewire sessions.
//!
//! Connects a [`Client`](stagewire_client::Client) and a
//! [`Server`](stagewire_server::Server) through in-memory frame channels so
//! whole conversations can run inside a unit test, and provides a reference
//! model of the server's request state for model-based property tests.
//!
//! # Architecture
//!
//! ```text
//! Client ──MemoryTransport──> MemoryInbox ──receive──> Server
//!    ▲                                                   │
//!    └──receive── MemoryInbox <──MemoryTransport─────────┘
//! ```
//!
//! Frames stay queued until [`Conversation::settle`] delivers them, so tests
//! control exactly when each side observes the other.

mod error;
mod log;
mod memory;
pub mod model;
mod world;

pub use error::HarnessError;
pub use log::EventLog;
pub use memory::{Delivery, MemoryInbox, MemoryTransport, channel};
pub use model::{ModelKind, ModelSession, Operation};
pub use world::Conversation;

/// Install a test-friendly `tracing` subscriber.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Safe to call from every test;
/// only the first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
