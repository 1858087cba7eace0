//! Error types for the RouterOS API client

use thiserror::Error;

use crate::protocol::ProtocolError;

/// Main client error type
///
/// Every expected failure (authentication, traps, transport loss, connect
/// timeout) is returned as a value of this type; the library does not panic
/// on router or network behavior.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A command was issued before `connect()`
    #[error("Not connected")]
    NotConnected,

    /// The transport refused to open or timed out
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    /// The router answered `!trap`; the payload is the trap message
    #[error("{0}")]
    Trap(String),

    /// The router answered `!fatal`
    #[error("Fatal error: {0}")]
    Fatal(String),

    /// The socket raised an error mid-command
    #[error("Transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// The peer closed the connection mid-command
    #[error("Connection closed")]
    ConnectionClosed,

    /// The peer ended its side of the stream mid-command
    #[error("Connection ended")]
    ConnectionEnded,

    /// A failure surfaced while running the login sequence
    #[error("Login failed: {0}")]
    LoginFailed(#[source] Box<ApiError>),

    /// The legacy login challenge was not valid hex
    #[error("Invalid login challenge: {0}")]
    InvalidChallenge(#[from] hex::FromHexError),

    /// Destroying the transport failed
    #[error("Close error: {0}")]
    Close(String),

    /// The byte stream violated the wire format
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    /// True when the error is a server-side `!trap` reply, including one
    /// wrapped by the login sequence
    #[must_use]
    pub fn is_trap(&self) -> bool {
        match self {
            Self::Trap(_) => true,
            Self::LoginFailed(inner) => inner.is_trap(),
            _ => false,
        }
    }
}

/// Convenient alias for Result with the client error
pub type Result<T> = std::result::Result<T, ApiError>;
