//! Command parsing and execution.
//!
//! A request is trimmed of surrounding whitespace and split on single
//! spaces. Consecutive spaces therefore produce empty tokens, which are
//! kept when the value is rejoined.

use crate::cache::CacheStore;
use crate::error::CommandError;
use crate::protocol::Response;

const TTL_PREFIX: &[u8] = b"ttl=";

// == Command ==
/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get {
        key: String,
    },
    Set {
        key: String,
        value: Vec<u8>,
        ttl: Option<u64>,
    },
}

impl Command {
    // == Parse ==
    /// Parses one request as delivered by a single socket read.
    pub fn parse(input: &[u8]) -> Result<Self, CommandError> {
        let tokens: Vec<&[u8]> = input.trim_ascii().split(|b| *b == b' ').collect();
        let verb = tokens[0];

        if verb.eq_ignore_ascii_case(b"get") {
            if tokens.len() != 2 {
                return Err(CommandError::WrongArgCount {
                    verb: "GET",
                    received: tokens.len(),
                    expected: "2",
                });
            }
            return Ok(Command::Get {
                key: key(tokens[1])?,
            });
        }

        if verb.eq_ignore_ascii_case(b"set") {
            if tokens.len() <= 2 {
                return Err(CommandError::WrongArgCount {
                    verb: "SET",
                    received: tokens.len(),
                    expected: "more than 2",
                });
            }

            let last = tokens[tokens.len() - 1];
            let (value_tokens, ttl) = match parse_ttl(last) {
                Some(ttl) => (&tokens[2..tokens.len() - 1], Some(ttl)),
                None => (&tokens[2..], None),
            };

            return Ok(Command::Set {
                key: key(tokens[1])?,
                value: strip_quotes(value_tokens.join(&b' ')),
                ttl,
            });
        }

        Err(CommandError::UnknownCommand)
    }

    // == Execute ==
    /// Applies the command to the store.
    pub fn execute(self, store: &mut CacheStore) -> Response {
        match self {
            Command::Get { key } => match store.get(&key) {
                Some(value) => Response::Value(value),
                None => Response::NotFound,
            },
            Command::Set { key, value, ttl } => {
                store.put(key, value, ttl);
                Response::Success
            }
        }
    }
}

/// Parses and executes one request against the store.
pub fn process(input: &[u8], store: &mut CacheStore) -> Result<Response, CommandError> {
    Command::parse(input).map(|command| command.execute(store))
}

/// Keys must be UTF-8; other byte strings are refused rather than decoded
/// lossily, so distinct keys never collapse into one.
fn key(token: &[u8]) -> Result<String, CommandError> {
    std::str::from_utf8(token)
        .map(str::to_owned)
        .map_err(|_| CommandError::InvalidKey)
}

/// `TTL=<digits>`, prefix case-insensitive. Digits too large for a `u64`
/// saturate.
fn parse_ttl(token: &[u8]) -> Option<u64> {
    if token.len() <= TTL_PREFIX.len() || !token[..TTL_PREFIX.len()].eq_ignore_ascii_case(TTL_PREFIX) {
        return None;
    }
    let digits = &token[TTL_PREFIX.len()..];
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let digits = std::str::from_utf8(digits).ok()?;
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Drops one leading and one trailing `"` when the value both starts and
/// ends with one. A lone `"` becomes empty.
fn strip_quotes(value: Vec<u8>) -> Vec<u8> {
    match (value.first(), value.last()) {
        (Some(&b'"'), Some(&b'"')) if value.len() == 1 => Vec::new(),
        (Some(&b'"'), Some(&b'"')) => value[1..value.len() - 1].to_vec(),
        _ => value,
    }
}
