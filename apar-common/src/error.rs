//! Common error types for the APAR tracker

use std::time::Duration;
use thiserror::Error;

/// Common result type for APAR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Checklist submission rejected before it reaches the remote store
///
/// Messages are shown to the inspector verbatim, so they use the
/// human-readable field label rather than the internal key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required checklist field was missing or blank
    #[error("Harap isi field: {0}")]
    MissingField(&'static str),

    /// No asset was resolved from a scan before submitting
    #[error("Tidak ada APAR yang dipilih untuk diperiksa")]
    NoAssetSelected,
}

/// Remote call failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Client-side timeout fired and the request was aborted
    #[error("Timeout after {0:?}: gagal mengambil data dari server")]
    Timeout(Duration),

    /// Connection could not be established or was dropped
    #[error("Gagal terhubung ke server: {0}")]
    ConnectionFailed(String),

    /// Server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
}

/// Common error types across the APAR crates
#[derive(Error, Debug)]
pub enum Error {
    /// Checklist validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote call failure
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Asset lookup yielded no match
    #[error("Data tidak ditemukan untuk QRCODE: {0}")]
    NotFound(String),

    /// Remote payload could not be decoded
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of the transport itself (timeout, connection, HTTP status)
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// True when the client-side timeout aborted the call
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(NetworkError::Timeout(_)))
    }
}
