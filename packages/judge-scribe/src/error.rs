//! Typed errors for the scribe library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Field-level
//! extraction problems never show up here: a missing page element is
//! recovered inside its extractor with a sentinel value.

use thiserror::Error;

/// Errors that can end an extraction run early.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A newer navigation epoch started while this run was pending.
    #[error("extraction superseded by navigation epoch {current}")]
    Superseded { current: u64 },

    /// The page moved to another location before the tracker saw it.
    #[error("page left {expected} for {found} before extraction")]
    LocationChanged { expected: String, found: String },

    /// No adapter knows how to read this page.
    #[error("no page adapter handles {url}")]
    UnsupportedPage { url: String },
}

/// Failure reasons of the explanation collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExplainError {
    /// No generative-AI key in the credential store
    #[error("generative-AI credential is missing")]
    MissingCredential,

    /// Transport failure, non-success status or timeout
    #[error("explanation request failed: {0}")]
    Network(String),

    /// The response had no text at the expected path
    #[error("explanation response had an unexpected shape")]
    InvalidResponseShape,
}

/// Errors from the source-hosting REST API.
#[derive(Debug, Error)]
pub enum HostingError {
    /// No access token in the credential store
    #[error("source-hosting access token is missing")]
    MissingCredential,

    /// Token rejected (invalid or expired)
    #[error("source-hosting token was rejected (401)")]
    Unauthorized,

    /// The file already exists at the target path (409)
    #[error("file already exists: {path}")]
    AlreadyExists { path: String },

    /// Any other non-success status
    #[error("source-hosting API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure
    #[error("source-hosting request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Caller supplied an unusable argument
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from persisting a record artifact.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Hosting(#[from] HostingError),
}

/// Errors from the persisted key-value credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for explanation requests.
pub type ExplainResult<T> = std::result::Result<T, ExplainError>;

/// Result type alias for source-hosting operations.
pub type HostingResult<T> = std::result::Result<T, HostingError>;

/// Result type alias for credential store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
