//! # Schemas Module
//!
//! Wire structures for the two backend flavours: the OpenAI-compatible
//! chat-completion API (llama.cpp server, LM Studio) and Ollama's native API.
//!
//! Response types are lenient. Servers add fields freely and differ in what
//! they omit, so everything the benchmark does not strictly need is optional.

use serde::{Deserialize, Serialize};

// =============================================================================
// OPENAI-COMPATIBLE API
// =============================================================================

/// # Chat Completion Request
///
/// Non-streaming chat completion carrying the configured sampling fields.
/// `repeat_penalty` is not part of OpenAI's API but both local servers honour it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ResponseMessage,
}

/// Assistant message; reasoning models put their chain of thought in
/// `reasoning_content` (llama.cpp) or `thinking`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub reasoning_content: Option<String>,
    pub thinking: Option<String>,
}

impl ResponseMessage {
    /// Non-empty reasoning text, whichever field carries it
    pub fn reasoning(&self) -> Option<&str> {
        let non_blank = |text: &&str| !text.trim().is_empty();
        self.reasoning_content
            .as_deref()
            .filter(non_blank)
            .or_else(|| self.thinking.as_deref().filter(non_blank))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// `GET /v1/models`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

// =============================================================================
// OLLAMA NATIVE API
// =============================================================================

/// `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    /// Number of generated tokens
    pub eval_count: Option<u64>,
    /// Generation time in nanoseconds as measured by the server
    pub eval_duration: Option<u64>,
}

/// `GET /api/tags`
#[derive(Debug, Clone, Deserialize)]
pub struct TagList {
    pub models: Vec<TagEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    pub name: String,
}
