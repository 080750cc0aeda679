//! GitHub REST API client.
//!
//! Covers the three calls the publishing path needs: list the user's
//! repositories, fetch one repository, and create a file. Every call
//! reads the access token from the credential store; a `401` removes
//! the stored token so the next run asks for a fresh one.

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{ApiErrorBody, Committer, CreateFileRequest, CreatedFile, Repository};
use crate::error::{HostingError, HostingResult};
use crate::traits::store::{CredentialStore, GITHUB_TOKEN};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("judge-scribe/", env!("CARGO_PKG_VERSION"));

/// Placeholder file that makes an otherwise empty folder exist.
const FOLDER_KEEP_FILE: &str = ".gitkeep";

#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    base_url: String,
    committer: Committer,
}

impl GithubClient {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            store,
            base_url: DEFAULT_API_URL.to_string(),
            committer: Committer::default(),
        }
    }

    /// Set a custom API base URL (GitHub Enterprise, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_committer(mut self, committer: Committer) -> Self {
        self.committer = committer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Repositories of the authenticated user (first 100).
    pub async fn list_repositories(&self) -> HostingResult<Vec<Repository>> {
        let url = format!("{}/user/repos?per_page=100", self.base_url);
        let resp = self.authorized(self.client.get(&url)).await?.send().await?;
        let repos: Vec<Repository> = self.json(resp, None).await?;
        debug!(count = repos.len(), "GitHub repositories fetched");
        Ok(repos)
    }

    /// Details of one repository, by `owner/name`.
    pub async fn repository(&self, full_name: &str) -> HostingResult<Repository> {
        let (owner, repo) = split_full_name(full_name)?;
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        let resp = self.authorized(self.client.get(&url)).await?.send().await?;
        self.json(resp, None).await
    }

    /// Create a file at `path` in the default branch.
    ///
    /// Fails with [`HostingError::AlreadyExists`] if the path is taken.
    pub async fn create_file(
        &self,
        full_name: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> HostingResult<CreatedFile> {
        let (owner, repo) = split_full_name(full_name)?;
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(HostingError::InvalidInput("file path is empty".into()));
        }

        let url = format!("{}/repos/{}/{}/contents/{}", self.base_url, owner, repo, path);
        let body = CreateFileRequest {
            message,
            committer: &self.committer,
            content: STANDARD.encode(content),
        };

        let resp = self
            .authorized(self.client.put(&url).json(&body))
            .await?
            .send()
            .await?;
        let created: CreatedFile = self.json(resp, Some(path)).await?;
        info!(repo = %full_name, path = %created.content.path, "file created");
        Ok(created)
    }

    /// Create `folder` by adding a placeholder file to it.
    pub async fn create_folder(&self, full_name: &str, folder: &str) -> HostingResult<CreatedFile> {
        let folder = folder.trim_matches('/');
        if folder.is_empty() {
            return Err(HostingError::InvalidInput("folder name is empty".into()));
        }
        let path = format!("{}/{}", folder, FOLDER_KEEP_FILE);
        let message = format!("Create folder {}", folder);
        self.create_file(full_name, &path, b" ", &message).await
    }

    async fn authorized(&self, request: RequestBuilder) -> HostingResult<RequestBuilder> {
        let token = match self.store.get(GITHUB_TOKEN).await {
            Ok(Some(token)) => token,
            Ok(None) => return Err(HostingError::MissingCredential),
            Err(e) => {
                warn!(error = %e, "could not read GitHub token");
                return Err(HostingError::MissingCredential);
            }
        };

        Ok(request
            .bearer_auth(token.expose())
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .header(USER_AGENT, CLIENT_USER_AGENT))
    }

    /// Decode a success body or map the status to a [`HostingError`].
    ///
    /// `path` is the file path for create calls, so a 409 can name it.
    async fn json<T: DeserializeOwned>(&self, resp: Response, path: Option<&str>) -> HostingResult<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        match (status, path) {
            (StatusCode::UNAUTHORIZED, _) => {
                warn!("GitHub token rejected; removing it");
                if let Err(e) = self.store.remove(GITHUB_TOKEN).await {
                    warn!(error = %e, "could not remove rejected GitHub token");
                }
                Err(HostingError::Unauthorized)
            }
            (StatusCode::CONFLICT, Some(path)) => Err(HostingError::AlreadyExists {
                path: path.to_string(),
            }),
            // The contents API answers 422 "sha wasn't supplied" for an existing file.
            (StatusCode::UNPROCESSABLE_ENTITY, Some(path)) if message.contains("sha") => {
                Err(HostingError::AlreadyExists {
                    path: path.to_string(),
                })
            }
            _ => {
                warn!(status = %status, error = %message, "GitHub API error");
                Err(HostingError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

fn split_full_name(full_name: &str) -> HostingResult<(&str, &str)> {
    match full_name.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(HostingError::InvalidInput(format!(
            "repository must be owner/name, got {:?}",
            full_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        assert_eq!(split_full_name("octo/notes").unwrap(), ("octo", "notes"));
        assert!(split_full_name("notes").is_err());
        assert!(split_full_name("/notes").is_err());
        assert!(split_full_name("octo/").is_err());
        assert!(split_full_name("a/b/c").is_err());
    }
}
