use std::fmt;

/// Errors raised by the scene store and checksum handling.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing the index or a scene file.
    Io(std::io::Error),
    /// The scene index could not be encoded or decoded.
    Json(serde_json::Error),
    /// The provided checksum is empty or not valid hex of the right length.
    InvalidChecksum(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "scene store IO error: {err}"),
            Self::Json(err) => write!(f, "scene index JSON error: {err}"),
            Self::InvalidChecksum(msg) => write!(f, "invalid checksum: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidChecksum(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
