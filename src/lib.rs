//! RouterOS Client - async client for the MikroTik RouterOS management API
//!
//! This library connects to a single router over plain TCP or TLS,
//! authenticates (both the post-6.43 flow and the legacy MD5
//! challenge-response flow), runs API commands, and surfaces replies as
//! attribute records.

pub mod client;
pub mod config;
pub mod emitter;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use client::{CommandReply, RouterOsClient};
pub use config::{ClientOptions, Credentials};
pub use emitter::{Emitter, Event, Listener};
pub use error::{ApiError, Result};
pub use protocol::{Record, Sentence};

/// Creates a disconnected client for `options`
#[must_use]
pub fn create_client(options: ClientOptions) -> RouterOsClient {
    RouterOsClient::new(options)
}
