//! Commits artifacts to a GitHub repository.

use async_trait::async_trait;
use tracing::debug;

use crate::error::PersistError;
use crate::hosting::GithubClient;
use crate::traits::sink::{ArtifactSink, PersistedArtifact};
use crate::types::record::ProblemRecord;

/// Writes `<folder>/<judge>_<title>.json` into `repo`.
///
/// The folder defaults to the judge name. An artifact that already
/// exists is reported as [`HostingError::AlreadyExists`](crate::error::HostingError::AlreadyExists)
/// and left untouched.
#[derive(Clone)]
pub struct RepositorySink {
    client: GithubClient,
    repo: String,
    folder: Option<String>,
}

impl RepositorySink {
    /// Publish into `repo` (`owner/name`).
    pub fn new(client: GithubClient, repo: impl Into<String>) -> Self {
        Self {
            client,
            repo: repo.into(),
            folder: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Repository path of the artifact for `record`.
    pub fn artifact_path(&self, record: &ProblemRecord) -> String {
        let folder = self
            .folder
            .as_deref()
            .map(|f| f.trim_matches('/'))
            .unwrap_or_else(|| record.judge.as_str());
        if folder.is_empty() {
            record.artifact_filename()
        } else {
            format!("{}/{}", folder, record.artifact_filename())
        }
    }
}

#[async_trait]
impl ArtifactSink for RepositorySink {
    async fn persist(&self, record: &ProblemRecord) -> Result<PersistedArtifact, PersistError> {
        let json = record.to_artifact_json()?;
        let path = self.artifact_path(record);
        let message = format!("Add {}", record.full_title);

        let created = self
            .client
            .create_file(&self.repo, &path, json.as_bytes(), &message)
            .await?;
        debug!(repo = %self.repo, path = %created.content.path, "artifact committed");

        let location = created
            .content
            .html_url
            .unwrap_or_else(|| format!("{}/{}", self.repo, created.content.path));
        Ok(PersistedArtifact::new(self.name(), location))
    }

    fn name(&self) -> &str {
        "github"
    }
}
