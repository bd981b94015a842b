use std::fmt;

/// Result type for agchat-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the client layer.
///
/// Every variant is terminal for the operation that raised it: the adapter
/// never retries and never returns a partially assembled result.
#[derive(Debug)]
pub enum Error {
    /// Request could not be sent or the connection failed
    Http(reqwest::Error),

    /// Service answered with a non-success status
    Status { status: u16, message: String },

    /// Stream read failed before completion
    Io(std::io::Error),

    /// An event line could not be decoded
    Decode(serde_json::Error),

    /// A chunk carried undecodable output bytes
    Chunk(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::Status { status, message } => {
                write!(f, "Service error (status {}): {}", status, message)
            }
            Error::Io(err) => write!(f, "Stream read error: {}", err),
            Error::Decode(err) => write!(f, "Malformed event: {}", err),
            Error::Chunk(msg) => write!(f, "Malformed chunk: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Decode(err) => Some(err),
            Error::Status { .. } | Error::Chunk(_) => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}
