//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::protocol::ERROR_PREFIX;

// == Command Error Enum ==
/// Per-request parse failure.
///
/// These never close the connection: the handler reports them to the peer
/// as `ERROR: <message>` and keeps reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// GET with anything but two tokens, or SET with two or fewer
    #[error("Wrong number of args for {verb}. Received {received}, expected {expected}")]
    WrongArgCount {
        verb: &'static str,
        received: usize,
        expected: &'static str,
    },

    /// Verb is neither GET nor SET
    #[error("Unknown command. Not GET or SET")]
    UnknownCommand,

    /// Key bytes are not UTF-8
    #[error("Key is not valid UTF-8")]
    InvalidKey,
}

impl CommandError {
    // == Wire Line ==
    /// Formats the error as the line sent back to the client.
    pub fn to_wire(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

// == Cache Error Enum ==
/// Unified error type for startup, socket and client failures.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at startup
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Socket level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server answered with an `ERROR: ` line
    #[error("Server error: {0}")]
    Server(String),

    /// Key rejected by the client-side pattern
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Value the client refuses to send
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
