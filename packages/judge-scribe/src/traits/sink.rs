//! Artifact sink trait.

use async_trait::async_trait;

use crate::error::PersistError;
use crate::types::record::ProblemRecord;

/// Where a persisted artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedArtifact {
    /// Sink name
    pub sink: String,
    /// Path or URL of the artifact
    pub location: String,
}

impl PersistedArtifact {
    pub fn new(sink: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            location: location.into(),
        }
    }
}

/// Destination for finished records.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist the record as a JSON artifact.
    async fn persist(&self, record: &ProblemRecord) -> Result<PersistedArtifact, PersistError>;

    /// Sink name for logs and notifications.
    fn name(&self) -> &str;
}
