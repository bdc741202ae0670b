//! # OpenAI-Compatible Adapter Module
//!
//! Client for servers exposing the OpenAI chat-completions API: llama.cpp's
//! `llama-server` and LM Studio.
//!
//! ## Key Features:
//! - Model discovery through `/v1/models`
//! - Non-streaming `/v1/chat/completions` with the configured sampling fields
//! - Token count taken from `usage.completion_tokens`

use crate::{
    adapters::base::{AdapterUtils, BackendClient, Completion},
    adapters::BackendKind,
    config::SamplingParams,
    error::BenchError,
    schemas::{ChatCompletionRequest, ChatCompletionResponse, Message, ModelList},
};
use reqwest::Client;
use tracing::debug;

/// # OpenAI-Compatible Adapter
///
/// One instance per server; `kind` tells llama.cpp and LM Studio apart in
/// logs and artifact names.
#[derive(Clone, Debug)]
pub struct OpenAIAdapter {
    kind: BackendKind,
    /// Base URL without the `/v1` suffix (e.g., "http://localhost:8080")
    base: String,
    /// HTTP client with connection pooling
    client: Client,
}

impl OpenAIAdapter {
    /// Create a new OpenAI-compatible adapter instance
    pub fn new(kind: BackendKind, base: String, client: Client) -> Self {
        Self { kind, base, client }
    }

    fn build_request(model: &str, prompt: &str, sampling: &SamplingParams) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(prompt)],
            stream: false,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            repeat_penalty: sampling.repeat_penalty,
        }
    }
}

#[async_trait::async_trait]
impl BackendClient for OpenAIAdapter {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn base_url(&self) -> &str {
        &self.base
    }

    async fn list_models(&self) -> Vec<String> {
        let url = AdapterUtils::endpoint(&self.base, "/v1/models");
        match AdapterUtils::get_json::<ModelList>(&self.client, &url).await {
            Ok(list) => list.data.into_iter().map(|m| m.id).collect(),
            Err(e) => {
                debug!("Listing {} models at {} failed: {}", self.kind.label(), url, e);
                Vec::new()
            }
        }
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        sampling: &SamplingParams,
    ) -> Result<Completion, BenchError> {
        AdapterUtils::log_request(self.kind.name(), model, prompt.len());

        let url = AdapterUtils::endpoint(&self.base, "/v1/chat/completions");
        let request_payload = serde_json::to_value(Self::build_request(model, prompt, sampling))?;

        let (elapsed, raw_response) = AdapterUtils::timed_post(&self.client, &url, &request_payload).await?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&raw_response).map_err(|e| {
            BenchError::MalformedResponse(format!("error decoding chat completion: {}", e))
        })?;
        let output_tokens = parsed
            .usage
            .and_then(|usage| usage.completion_tokens)
            .ok_or_else(|| BenchError::MalformedResponse("response has no usage.completion_tokens".to_string()))?;

        AdapterUtils::log_response(self.kind.name(), model, output_tokens, elapsed);

        Ok(Completion {
            elapsed,
            output_tokens,
            request_payload,
            raw_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http_client::HttpClientBuilder;

    #[test]
    fn test_openai_adapter_creation() {
        let client = HttpClientBuilder::new().build().unwrap();
        let adapter = OpenAIAdapter::new(BackendKind::LmStudio, "http://localhost:1234".to_string(), client);

        assert_eq!(adapter.kind(), BackendKind::LmStudio);
        assert_eq!(adapter.base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_request_carries_sampling_fields() {
        let sampling = SamplingParams {
            temperature: 0.2,
            max_tokens: 64,
            top_p: 0.8,
            repeat_penalty: 1.3,
        };
        let request = OpenAIAdapter::build_request("gemma-3-4b", "hello", &sampling);

        assert_eq!(request.messages, vec![Message::user("hello")]);
        assert!(!request.stream);
        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.repeat_penalty, 1.3);
    }
}
