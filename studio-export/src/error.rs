//! Export error types.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that abort an export.
///
/// Asset resolution failures are not among them: those fall back to the
/// original reference.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Archive assembly failed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Runtime configuration could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document cannot be exported.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The export configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The asset resolver could not be created.
    #[error("Asset resolver setup failed: {0}")]
    Resolver(#[from] AssetError),
}

/// Errors resolving a single asset reference.
#[derive(Debug, Error)]
pub enum AssetError {
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("asset request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("asset request to {url} returned status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// A `data:` URI that is malformed or not base64.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    /// A `blob:` reference nobody registered.
    #[error("unknown blob reference: {0}")]
    UnknownBlob(String),

    /// Reading a local file failed.
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    /// The reference is not a valid URL.
    #[error("invalid asset URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The resolver cannot handle this kind of reference.
    #[error("unsupported asset reference: {0}")]
    Unsupported(String),
}
