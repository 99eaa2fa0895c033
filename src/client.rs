//! Client Module
//!
//! Async consumer of the text protocol with client-side key validation,
//! JSON-typed values and a memoization helper.

use std::future::Future;

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::protocol::{ERROR_PREFIX, NOT_FOUND, SUCCESS};

/// Default pattern a key must match in full.
pub const DEFAULT_KEY_PATTERN: &str = r"[\w\d-]{2,}";

// == Client Options ==
/// Connection settings. Values stored through the client must be non-empty.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Bytes read per response; longer responses are truncated
    pub buffer_size: usize,
    /// Regular expression every key must match from start to end
    pub key_pattern: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            key_pattern: DEFAULT_KEY_PATTERN.to_string(),
        }
    }
}

// == Cache Client ==
/// One connection to a cache server.
///
/// Requests are strictly request/response: each call writes one command and
/// performs one read for the answer.
#[derive(Debug)]
pub struct CacheClient {
    stream: TcpStream,
    buffer: Vec<u8>,
    key_regex: Regex,
}

impl CacheClient {
    // == Connect ==
    pub async fn connect(addr: impl ToSocketAddrs, options: ClientOptions) -> Result<Self> {
        let key_regex = Regex::new(&format!("^(?:{})$", options.key_pattern))
            .map_err(|err| CacheError::Config(format!("invalid key pattern: {}", err)))?;
        let stream = TcpStream::connect(addr).await?;

        Ok(Self {
            stream,
            buffer: vec![0u8; options.buffer_size.max(1)],
            key_regex,
        })
    }

    // == Set ==
    /// Stores raw bytes. The value is always sent quoted so leading and
    /// trailing whitespace survive the server's trimming.
    ///
    /// Empty values are refused: the server would answer a later GET with a
    /// zero-byte write, which a reader cannot tell apart from no reply.
    pub async fn set(&mut self, key: &str, value: &[u8], ttl: Option<u64>) -> Result<()> {
        check_key(&self.key_regex, key)?;
        if value.is_empty() {
            return Err(CacheError::InvalidValue("empty values cannot be read back".to_string()));
        }

        let mut command = format!("SET {} \"", key).into_bytes();
        command.extend_from_slice(value);
        command.push(b'"');
        if let Some(ttl) = ttl {
            command.extend_from_slice(format!(" TTL={}", ttl).as_bytes());
        }

        let response = self.execute(&command).await?;
        if response != SUCCESS.as_bytes() {
            return Err(CacheError::Server(format!(
                "unexpected reply to SET: {}",
                String::from_utf8_lossy(&response)
            )));
        }
        Ok(())
    }

    // == Get ==
    /// Fetches raw bytes, `None` when the server answers `NOT FOUND`.
    pub async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        check_key(&self.key_regex, key)?;

        let response = self.execute(format!("GET {}", key).as_bytes()).await?;
        if response == NOT_FOUND.as_bytes() {
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Stores a value encoded as JSON.
    pub async fn set_value<T: Serialize>(&mut self, key: &str, value: &T, ttl: Option<u64>) -> Result<()> {
        let encoded = serde_json::to_vec(value)?;
        self.set(key, &encoded, ttl).await
    }

    /// Fetches and decodes a JSON value.
    pub async fn get_value<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or awaits `compute`, caches its
    /// result with `ttl` and returns it.
    pub async fn get_or_compute<T, F, Fut>(&mut self, key: &str, ttl: Option<u64>, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(cached) = self.get_value(key).await? {
            debug!(key, "memoized value hit");
            return Ok(cached);
        }

        let value = compute().await;
        self.set_value(key, &value, ttl).await?;
        Ok(value)
    }

    async fn execute(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        self.stream.write_all(command).await?;
        let n = self.stream.read(&mut self.buffer).await?;
        if n == 0 {
            return Err(CacheError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )));
        }

        let response = &self.buffer[..n];
        if response.starts_with(ERROR_PREFIX.as_bytes()) {
            return Err(CacheError::Server(
                String::from_utf8_lossy(&response[ERROR_PREFIX.len()..]).into_owned(),
            ));
        }
        Ok(response.to_vec())
    }
}

fn check_key(key_regex: &Regex, key: &str) -> Result<()> {
    if key_regex.is_match(key) {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(format!(
            "{:?} does not match {}",
            key,
            key_regex.as_str()
        )))
    }
}

// == Memo Key ==
/// Derives a cache key from a function name and its arguments: the hex
/// SHA-256 of the name and the JSON encoding of `args`.
pub fn memo_key<A: Serialize + ?Sized>(name: &str, args: &A) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"_");
    hasher.update(serde_json::to_vec(args)?);
    Ok(hex::encode(hasher.finalize()))
}
