//! Local JSON artifact files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::PersistError;
use crate::traits::sink::{ArtifactSink, PersistedArtifact};
use crate::types::record::ProblemRecord;

/// Writes `<dir>/<judge>_<title>.json`, replacing any previous file.
#[derive(Debug, Clone)]
pub struct FileArtifactSink {
    dir: PathBuf,
}

impl FileArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactSink {
    async fn persist(&self, record: &ProblemRecord) -> Result<PersistedArtifact, PersistError> {
        let json = record.to_artifact_json()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(record.artifact_filename());
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "artifact written");

        Ok(PersistedArtifact::new(self.name(), path.display().to_string()))
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LeetCodeAdapter;
    use crate::pipeline::ExtractionPipeline;
    use crate::testing::leetcode_page;

    #[tokio::test]
    async fn test_writes_artifact_that_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileArtifactSink::new(dir.path().join("artifacts"));
        let mut record = ExtractionPipeline::extract_snapshot(
            &LeetCodeAdapter::new(),
            &leetcode_page("1. Two Sum", "Accepted", Some(&["return []"])),
            "https://leetcode.com/problems/two-sum/",
        )
        .record;
        record.attach_explanation("Use a hash map.");

        let artifact = sink.persist(&record).await.unwrap();

        assert!(artifact.location.ends_with("leetcode_1_Two_Sum.json"));
        let written = std::fs::read_to_string(&artifact.location).unwrap();
        assert_eq!(ProblemRecord::from_artifact_json(&written).unwrap(), record);
    }
}
