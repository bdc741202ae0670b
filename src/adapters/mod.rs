//! # Backend Adapters Module
//!
//! Clients for the inference servers the benchmark can drive.
//!
//! ## Supported Backends:
//!
//! - **Ollama**: native `/api/generate` API
//! - **llama.cpp**: `llama-server`, OpenAI-compatible
//! - **LM Studio**: OpenAI-compatible local server

use crate::config::{BenchConfig, SamplingParams};
use crate::core::http_client::{HttpClientBuilder, HttpClientError};
use crate::error::BenchError;
use std::fmt;

// Base adapter functionality
pub mod base;

// Individual adapter modules
pub mod ollama;
pub mod openai;

pub use base::{AdapterUtils, BackendClient, Completion};
pub use ollama::OllamaAdapter;
pub use openai::OpenAIAdapter;

/// The servers offered in the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Ollama,
    LlamaCpp,
    LmStudio,
}

/// Wire protocol spoken by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// Ollama's `/api/*` endpoints
    Native,
    /// `/v1/*` endpoints
    OpenAICompatible,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Ollama, BackendKind::LlamaCpp, BackendKind::LmStudio];

    /// Short identifier used in file names and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::LlamaCpp => "llamacpp",
            Self::LmStudio => "lmstudio",
        }
    }

    /// Human-readable name for menus
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::LlamaCpp => "llama.cpp",
            Self::LmStudio => "LM Studio",
        }
    }

    pub fn flavor(&self) -> ApiFlavor {
        match self {
            Self::Ollama => ApiFlavor::Native,
            Self::LlamaCpp | Self::LmStudio => ApiFlavor::OpenAICompatible,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// # Backend Enum
///
/// Closed set of clients, selected once per session.
#[derive(Clone, Debug)]
pub enum Backend {
    Ollama(OllamaAdapter),
    OpenAI(OpenAIAdapter),
}

impl Backend {
    /// Factory method building the client for `kind` from the current settings
    pub fn for_kind(kind: BackendKind, config: &BenchConfig) -> Result<Self, HttpClientError> {
        let client = HttpClientBuilder::from_config(config).build()?;
        let base = config.url_for(kind).trim_end_matches('/').to_string();

        Ok(match kind.flavor() {
            ApiFlavor::Native => Self::Ollama(OllamaAdapter::new(base, client)),
            ApiFlavor::OpenAICompatible => Self::OpenAI(OpenAIAdapter::new(kind, base, client)),
        })
    }
}

#[async_trait::async_trait]
impl BackendClient for Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Self::Ollama(adapter) => adapter.kind(),
            Self::OpenAI(adapter) => adapter.kind(),
        }
    }

    fn base_url(&self) -> &str {
        match self {
            Self::Ollama(adapter) => adapter.base_url(),
            Self::OpenAI(adapter) => adapter.base_url(),
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self {
            Self::Ollama(adapter) => adapter.list_models().await,
            Self::OpenAI(adapter) => adapter.list_models().await,
        }
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        sampling: &SamplingParams,
    ) -> Result<Completion, BenchError> {
        match self {
            Self::Ollama(adapter) => adapter.complete(model, prompt, sampling).await,
            Self::OpenAI(adapter) => adapter.complete(model, prompt, sampling).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        let mut config = BenchConfig::default();
        config.llamacpp_url = "http://127.0.0.1:8081/".to_string();

        let ollama = Backend::for_kind(BackendKind::Ollama, &config).unwrap();
        assert!(matches!(ollama, Backend::Ollama(_)));
        assert_eq!(ollama.base_url(), "http://localhost:11434");

        let llamacpp = Backend::for_kind(BackendKind::LlamaCpp, &config).unwrap();
        assert!(matches!(llamacpp, Backend::OpenAI(_)));
        assert_eq!(llamacpp.kind(), BackendKind::LlamaCpp);
        assert_eq!(llamacpp.base_url(), "http://127.0.0.1:8081");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(BackendKind::LmStudio.to_string(), "lmstudio");
        assert_eq!(BackendKind::LlamaCpp.label(), "llama.cpp");
        assert_eq!(BackendKind::Ollama.flavor(), ApiFlavor::Native);
    }
}
