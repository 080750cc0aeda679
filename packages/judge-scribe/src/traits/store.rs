//! Persisted key-value credential storage.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::security::credentials::SecretString;

/// Key holding the generative-AI API key.
pub const GEMINI_API_KEY: &str = "gemini_api_key";

/// Key holding the source-hosting access token.
pub const GITHUB_TOKEN: &str = "github_token";

/// Key holding the repository artifacts are published to.
pub const LAST_SELECTED_REPO: &str = "last_selected_repo";

/// Extension-scoped key-value storage.
///
/// Read at pipeline-trigger time; written by the settings surface.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value. Empty strings read as absent.
    async fn get(&self, key: &str) -> StoreResult<Option<SecretString>>;

    /// Write a value.
    async fn set(&self, key: &str, value: SecretString) -> StoreResult<()>;

    /// Remove a value (no-op if absent).
    async fn remove(&self, key: &str) -> StoreResult<()>;
}
