// Error types for video resolution and download

use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// Extraction backend could not resolve the video id
    /// (invalid id, network failure, access restriction)
    Resolution(String),

    /// Required metadata field absent from backend output
    MissingField(&'static str),

    /// Backend emitted output we could not decode
    Parse(String),

    /// Network or filesystem failure mid-transfer.
    /// Partial output files are intentionally left on disk.
    Transfer(String),

    /// Remux tool unavailable or exited non-zero.
    /// The pre-remux temp file is left on disk for recovery.
    Remux(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution(msg) => write!(f, "Resolution error: {}", msg),
            Self::MissingField(field) => write!(f, "Missing required field: {}", field),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::Transfer(msg) => write!(f, "Transfer error: {}", msg),
            Self::Remux(msg) => write!(f, "Remux error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
