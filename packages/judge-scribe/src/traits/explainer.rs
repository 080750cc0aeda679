//! Explanation requester trait.

use async_trait::async_trait;

use crate::error::ExplainResult;

/// Asynchronous collaborator that explains submitted code in prose.
///
/// Implementations wrap a specific generative-AI provider. Failures are
/// reported, never panicked: the session treats them as independent of
/// the extraction outcome.
#[async_trait]
pub trait ExplanationRequester: Send + Sync {
    /// Explain `code` written for the problem titled `title`.
    async fn explain(&self, code: &str, title: &str) -> ExplainResult<String>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
