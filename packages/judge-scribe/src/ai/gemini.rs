//! Gemini `generateContent` explanation requester.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::prompt::explanation_prompt;
use crate::error::{ExplainError, ExplainResult};
use crate::traits::explainer::ExplanationRequester;
use crate::traits::store::{CredentialStore, GEMINI_API_KEY};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const TEMPERATURE: f64 = 0.4;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateContentRequest {
    fn prompt(text: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(text) }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}

impl GenerateContentResponse {
    /// Text at `candidates[0].content.parts[0].text`.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.trim().is_empty())
    }
}

/// Explains code through the Gemini REST API.
///
/// The API key is read from the credential store on every call, so a key
/// saved after the session started is picked up without a restart.
#[derive(Clone)]
pub struct GeminiExplainer {
    http_client: Client,
    store: Arc<dyn CredentialStore>,
    base_url: String,
    model: String,
}

impl GeminiExplainer {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            http_client: Client::new(),
            store,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn api_key(&self) -> ExplainResult<String> {
        match self.store.get(GEMINI_API_KEY).await {
            Ok(Some(key)) => Ok(key.expose().to_string()),
            Ok(None) => Err(ExplainError::MissingCredential),
            Err(e) => {
                warn!(error = %e, "could not read Gemini API key");
                Err(ExplainError::MissingCredential)
            }
        }
    }
}

#[async_trait]
impl ExplanationRequester for GeminiExplainer {
    async fn explain(&self, code: &str, title: &str) -> ExplainResult<String> {
        let api_key = self.api_key().await?;
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", api_key.as_str())])
            .json(&GenerateContentRequest::prompt(explanation_prompt(code, title)))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                ExplainError::Network(e.without_url().to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = %status, error = %message, "Gemini API error");
            return Err(ExplainError::Network(format!("status {}: {}", status.as_u16(), message)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExplainError::Network(e.without_url().to_string()))?;

        let text = serde_json::from_str::<GenerateContentResponse>(&body)
            .ok()
            .and_then(GenerateContentResponse::into_text)
            .ok_or_else(|| {
                warn!("Gemini response had no candidate text");
                ExplainError::InvalidResponseShape
            })?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Gemini explanation received"
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
