//! # Ollama Adapter Module
//!
//! Client for Ollama's native API. Models come from `/api/tags`, completions
//! from a non-streaming `/api/generate` call whose `eval_count` is the number
//! of generated tokens.

use crate::{
    adapters::base::{AdapterUtils, BackendClient, Completion},
    adapters::BackendKind,
    config::SamplingParams,
    error::BenchError,
    schemas::{GenerateRequest, GenerateResponse, TagList},
};
use reqwest::Client;
use tracing::debug;

/// # Ollama Adapter
///
/// Sampling parameters are not forwarded; Ollama runs each model with the
/// options baked into its Modelfile.
#[derive(Clone, Debug)]
pub struct OllamaAdapter {
    /// Base URL for the Ollama server (e.g., "http://localhost:11434")
    base: String,
    /// HTTP client with connection pooling
    client: Client,
}

impl OllamaAdapter {
    /// Create a new Ollama adapter instance
    pub fn new(base: String, client: Client) -> Self {
        Self { base, client }
    }

    fn build_request(model: &str, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
        }
    }
}

#[async_trait::async_trait]
impl BackendClient for OllamaAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Ollama
    }

    fn base_url(&self) -> &str {
        &self.base
    }

    async fn list_models(&self) -> Vec<String> {
        let url = AdapterUtils::endpoint(&self.base, "/api/tags");
        match AdapterUtils::get_json::<TagList>(&self.client, &url).await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                debug!("Listing Ollama models at {} failed: {}", url, e);
                Vec::new()
            }
        }
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        _sampling: &SamplingParams,
    ) -> Result<Completion, BenchError> {
        AdapterUtils::log_request("ollama", model, prompt.len());

        let url = AdapterUtils::endpoint(&self.base, "/api/generate");
        let request_payload = serde_json::to_value(Self::build_request(model, prompt))?;

        let (elapsed, raw_response) = AdapterUtils::timed_post(&self.client, &url, &request_payload).await?;

        let parsed: GenerateResponse = serde_json::from_str(&raw_response).map_err(|e| {
            BenchError::MalformedResponse(format!("error decoding Ollama response: {}", e))
        })?;
        let output_tokens = parsed.eval_count.unwrap_or(0);

        AdapterUtils::log_response("ollama", model, output_tokens, elapsed);

        Ok(Completion {
            elapsed,
            output_tokens,
            request_payload,
            raw_response,
        })
    }
}
