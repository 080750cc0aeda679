use serde::{Deserialize, Serialize};

/// Repository owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// A repository as returned by `/user/repos` and `/repos/{full_name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub private: bool,
    pub html_url: Option<String>,
    pub default_branch: Option<String>,
    pub description: Option<String>,
}

/// Commit identity attached to created files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

impl Default for Committer {
    fn default() -> Self {
        Self {
            name: "Judge Scribe".to_string(),
            email: "judge-scribe@users.noreply.github.com".to_string(),
        }
    }
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateFileRequest<'a> {
    pub message: &'a str,
    pub committer: &'a Committer,
    /// Base64-encoded file content
    pub content: String,
}

/// Result of a file creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedFile {
    pub content: FileContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub sha: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
