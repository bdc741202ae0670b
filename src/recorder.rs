//! # Run Recorder
//!
//! Persists the artifacts of one iteration inside the session directory:
//!
//! - `<stem>.req` - request record (who, what, when, exact payload, prompt)
//! - `<stem>.res.json` - response body exactly as received
//! - `<stem>.res.md` - readable rendering of the answer, best effort

use crate::adapters::{ApiFlavor, BackendKind};
use crate::error::BenchError;
use crate::prompts::prompt_label;
use crate::schemas::{ChatCompletionResponse, GenerateResponse};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Inputs for one iteration's artifacts.
#[derive(Debug, Clone)]
pub struct RunRecord<'a> {
    pub backend: BackendKind,
    pub model: &'a str,
    pub prompt_file: &'a str,
    pub prompt: &'a str,
    pub request_payload: &'a Value,
    pub raw_response: &'a str,
    pub run_number: u32,
}

/// Files written for one iteration.
#[derive(Debug)]
pub struct RunArtifacts {
    pub request: PathBuf,
    pub raw_response: PathBuf,
    /// The rendered answer is a convenience; its failure never fails the run.
    pub rendered: Result<PathBuf, BenchError>,
}

#[derive(Serialize)]
struct RequestRecord<'a> {
    backend: &'a str,
    model: &'a str,
    prompt_file: &'a str,
    timestamp: String,
    run_number: u32,
    payload: &'a Value,
    prompt: &'a str,
}

#[derive(Debug, Clone)]
pub struct RunRecorder {
    session_dir: PathBuf,
}

impl RunRecorder {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
        }
    }

    /// Write the request record, the raw response and the rendered answer.
    ///
    /// Fails only when the request record or the raw response cannot be written.
    pub fn record(&self, run: &RunRecord<'_>) -> Result<RunArtifacts, BenchError> {
        fs::create_dir_all(&self.session_dir)?;

        let now = Local::now();
        let stem = artifact_stem(&now, run);

        let request = self.session_dir.join(format!("{}.req", stem));
        let record = RequestRecord {
            backend: run.backend.name(),
            model: run.model,
            prompt_file: run.prompt_file,
            timestamp: now.to_rfc3339(),
            run_number: run.run_number,
            payload: run.request_payload,
            prompt: run.prompt,
        };
        fs::write(&request, serde_json::to_string_pretty(&record)?)?;

        let raw_response = self.session_dir.join(format!("{}.res.json", stem));
        fs::write(&raw_response, run.raw_response)?;

        let rendered_path = self.session_dir.join(format!("{}.res.md", stem));
        let rendered = render_response(run.backend.flavor(), run.raw_response)
            .and_then(|text| fs::write(&rendered_path, text).map_err(BenchError::from))
            .map(|_| rendered_path);
        if let Err(e) = &rendered {
            debug!(stem = %stem, "Rendered response skipped: {}", e);
        }

        Ok(RunArtifacts {
            request,
            raw_response,
            rendered,
        })
    }
}

/// `{timestamp}_{backend}_{model}_{prompt}_run{n}`
fn artifact_stem(now: &DateTime<Local>, run: &RunRecord<'_>) -> String {
    format!(
        "{}_{}_{}_{}_run{}",
        now.format("%Y%m%d_%H%M%S_%6f"),
        run.backend.name(),
        safe_model_name(run.model),
        prompt_label(run.prompt_file),
        run.run_number
    )
}

/// Model name usable as part of a file name (`library/qwen3:8b` -> `library_qwen3_8b`)
pub fn safe_model_name(model: &str) -> String {
    model.replace(['/', '\\', ':'], "_")
}

/// Human-readable answer extracted from a raw response body.
///
/// For OpenAI-compatible servers a reasoning section, when present, precedes
/// the answer.
pub fn render_response(flavor: ApiFlavor, raw: &str) -> Result<String, BenchError> {
    match flavor {
        ApiFlavor::Native => {
            let parsed: GenerateResponse = serde_json::from_str(raw)?;
            Ok(parsed.response)
        }
        ApiFlavor::OpenAICompatible => {
            let parsed: ChatCompletionResponse = serde_json::from_str(raw)?;
            let message = &parsed
                .choices
                .first()
                .ok_or_else(|| BenchError::MalformedResponse("response has no choices".to_string()))?
                .message;
            let content = message.content.as_deref().unwrap_or_default();

            Ok(match message.reasoning() {
                Some(reasoning) => format!(
                    "## Reasoning\n\n{}\n\n---\n\n## Answer\n\n{}\n",
                    reasoning.trim(),
                    content.trim()
                ),
                None => content.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_model_name() {
        assert_eq!(safe_model_name("hf.co/unsloth/Qwen3:Q4_K_M"), "hf.co_unsloth_Qwen3_Q4_K_M");
        assert_eq!(safe_model_name(r"C:\models\x"), "C__models_x");
    }

    #[test]
    fn test_native_rendering_is_plain_text() {
        let raw = json!({"response": "The sky scatters blue light.", "eval_count": 7}).to_string();
        assert_eq!(
            render_response(ApiFlavor::Native, &raw).unwrap(),
            "The sky scatters blue light."
        );
    }

    #[test]
    fn test_openai_rendering_without_reasoning() {
        let raw = json!({"choices": [{"message": {"role": "assistant", "content": "answer"}}]}).to_string();
        assert_eq!(render_response(ApiFlavor::OpenAICompatible, &raw).unwrap(), "answer");
    }

    #[test]
    fn test_openai_rendering_puts_reasoning_first() {
        let raw = json!({"choices": [{"message": {"content": "answer", "reasoning_content": "step1"}}]}).to_string();
        let text = render_response(ApiFlavor::OpenAICompatible, &raw).unwrap();

        let reasoning_at = text.find("## Reasoning").unwrap();
        let step_at = text.find("step1").unwrap();
        let answer_heading_at = text.find("## Answer").unwrap();
        let answer_at = text.find("answer").unwrap();
        assert!(reasoning_at < step_at);
        assert!(step_at < answer_heading_at);
        assert!(answer_heading_at < answer_at);
    }

    #[test]
    fn test_rendering_rejects_garbage() {
        assert!(render_response(ApiFlavor::OpenAICompatible, "<html>502</html>").is_err());
        assert!(render_response(ApiFlavor::OpenAICompatible, r#"{"choices": []}"#).is_err());
    }
}
