//! Response markers and their wire encoding.

/// Sent for a GET on a missing or expired key.
pub const NOT_FOUND: &str = "NOT FOUND";

/// Sent after a successful SET.
pub const SUCCESS: &str = "SUCCESS";

/// Leading text of every error line.
pub const ERROR_PREFIX: &str = "ERROR: ";

// == Response ==
/// Successful outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Stored value returned by GET
    Value(Vec<u8>),
    /// GET found nothing; a normal result, not an error
    NotFound,
    /// SET committed
    Success,
}

impl Response {
    /// Bytes written back to the client.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Response::Value(value) => value,
            Response::NotFound => NOT_FOUND.as_bytes(),
            Response::Success => SUCCESS.as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_on_the_wire() {
        assert_eq!(Response::NotFound.as_bytes(), b"NOT FOUND");
        assert_eq!(Response::Success.as_bytes(), b"SUCCESS");
        assert_eq!(Response::Value(b"me ".to_vec()).as_bytes(), b"me ");
    }
}
