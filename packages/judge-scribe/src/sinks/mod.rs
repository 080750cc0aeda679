//! Artifact sink implementations.
//!
//! Available sinks:
//! - `FileArtifactSink` - JSON file in a local directory
//! - `RepositorySink` - JSON file committed to a GitHub repository

pub mod file;
pub mod repository;

pub use file::FileArtifactSink;
pub use repository::RepositorySink;
