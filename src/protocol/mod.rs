//! Protocol Module
//!
//! Plain-text command grammar spoken over the TCP socket.
//!
//! # Commands
//! - `GET <key>` - Returns the value or `NOT FOUND`
//! - `SET <key> <value...> [TTL=<seconds>]` - Stores a value, returns `SUCCESS`
//!
//! Failures are answered with `ERROR: <description>`. There is no framing:
//! each socket read is taken as exactly one command and each response is a
//! single unterminated write.

mod command;
mod response;

pub use command::{process, Command};
pub use response::{Response, ERROR_PREFIX, NOT_FOUND, SUCCESS};
