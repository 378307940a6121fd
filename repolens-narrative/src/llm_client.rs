//! Gemini text-generation client
//!
//! One `generateContent` request per prompt; the first text part of the first
//! candidate is the answer.

use async_trait::async_trait;
use repolens_core::{with_timeout, ErrorContext, LlmConfig, RepoLensError, RepoLensResult, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl GeminiClient {
    /// Fails with a configuration error when no API key is configured
    pub fn new(config: LlmConfig) -> RepoLensResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RepoLensError::Config {
                message: "Gemini API key not found".to_string(),
                source: None,
                context: ErrorContext::new("gemini_client")
                    .with_operation("create_client")
                    .with_suggestion("Set the GEMINI_API_KEY environment variable")
                    .with_suggestion("Or set llm.api_key in the configuration file"),
            })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| RepoLensError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("gemini_client").with_operation("create_client"),
            })?;

        info!("Created Gemini client with model: {}", config.model);

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn llm_error(&self, message: String, operation: &str) -> Box<RepoLensError> {
        Box::new(RepoLensError::Llm {
            message,
            provider: Some("gemini".to_string()),
            model: Some(self.config.model.clone()),
            context: ErrorContext::new("gemini_client").with_operation(operation),
        })
    }

    async fn send(&self, prompt: &str) -> RepoLensResult<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.llm_error(format!("Request failed: {}", e), "generate"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.llm_error(
                format!("API error {}: {}", status.as_u16(), body),
                "generate",
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.llm_error(format!("Malformed response: {}", e), "parse_response"))?;

        parsed
            .into_text()
            .ok_or_else(|| self.llm_error("No text content in response".to_string(), "parse_response"))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> RepoLensResult<String> {
        let start_time = Instant::now();
        debug!("Generating content from a {} char prompt", prompt.len());

        let timeout_ms = self.config.timeout_seconds.saturating_mul(1000);
        let result = with_timeout(self.send(prompt), timeout_ms, "gemini_generate").await?;

        match &result {
            Ok(text) => info!(
                "Generated response in {:?} ({} chars)",
                start_time.elapsed(),
                text.len()
            ),
            Err(e) => warn!("Generation failed: {}", e),
        }
        result
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
