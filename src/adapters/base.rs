//! # Base Adapter Functionality
//!
//! The capability shared by every backend client plus the timed HTTP exchange
//! both flavours use.

use crate::{
    adapters::BackendKind,
    config::SamplingParams,
    core::http_client::LIST_MODELS_TIMEOUT,
    error::BenchError,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of one completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Wall-clock time of the network exchange only
    pub elapsed: Duration,
    pub output_tokens: u64,
    /// Exact JSON body that was sent
    pub request_payload: Value,
    /// Response body, verbatim
    pub raw_response: String,
}

impl Completion {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Base trait that both backend flavours implement
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    /// Which server this client talks to
    fn kind(&self) -> BackendKind;

    /// Get the base URL for this client
    fn base_url(&self) -> &str;

    /// Models the server offers. Any failure yields an empty list.
    async fn list_models(&self) -> Vec<String>;

    /// Run one non-streaming completion.
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        sampling: &SamplingParams,
    ) -> Result<Completion, BenchError>;
}

/// Utility functions for adapters
pub struct AdapterUtils;

impl AdapterUtils {
    /// Join a base URL and an API path without doubling slashes
    pub fn endpoint(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// GET a small JSON document with the short listing timeout.
    pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, BenchError> {
        let resp = client
            .get(url)
            .timeout(LIST_MODELS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST `payload` and return the elapsed time of the exchange with the body.
    ///
    /// The clock starts right before the request is sent and stops once the full
    /// body has been read, so payload construction and parsing are not timed.
    pub async fn timed_post(
        client: &Client,
        url: &str,
        payload: &Value,
    ) -> Result<(Duration, String), BenchError> {
        let request = client.post(url).json(payload);

        let start_time = Instant::now();
        let resp = request.send().await.map_err(|e| {
            debug!("Request to {} failed: {}", url, e);
            BenchError::from(e)
        })?;
        let status = resp.status();
        let response_bytes = resp.bytes().await.map_err(|e| {
            debug!("Failed to read response body from {}: {}", url, e);
            BenchError::Upstream(format!("error reading response body: {}", e))
        })?;
        let elapsed = start_time.elapsed();

        let body = String::from_utf8_lossy(&response_bytes).into_owned();
        if !status.is_success() {
            debug!("Error response from {}: {}", url, body);
            return Err(BenchError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        Ok((elapsed, body))
    }

    /// Log adapter request for debugging
    pub fn log_request(backend: &str, model: &str, prompt_chars: usize) {
        debug!(
            backend = backend,
            model = model,
            prompt_chars = prompt_chars,
            "Sending completion request"
        );
    }

    /// Log adapter response for debugging
    pub fn log_response(backend: &str, model: &str, tokens: u64, elapsed: Duration) {
        debug!(
            backend = backend,
            model = model,
            tokens = tokens,
            response_time_ms = elapsed.as_millis() as u64,
            "Completed completion request"
        );
    }
}
