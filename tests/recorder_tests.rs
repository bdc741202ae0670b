//! # Run Recorder Tests
//!
//! Artifact names and contents for both backend flavours.

use llm_speedbench::{BackendKind, RunRecord, RunRecorder};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

fn file_name(path: &PathBuf) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

#[test]
fn test_artifacts_for_openai_run_with_reasoning() {
    let dir = tempfile::tempdir().unwrap();
    let session_dir = dir.path().join("20261019_101500");
    let recorder = RunRecorder::new(&session_dir);

    let payload = json!({
        "model": "unsloth/Qwen3-8B:Q4_K_M",
        "messages": [{"role": "user", "content": "What is 2+2?"}],
        "stream": false
    });
    let raw = json!({
        "choices": [{"message": {"role": "assistant", "reasoning_content": "step1", "content": "answer"}}],
        "usage": {"completion_tokens": 12}
    })
    .to_string();

    let artifacts = recorder
        .record(&RunRecord {
            backend: BackendKind::LlamaCpp,
            model: "unsloth/Qwen3-8B:Q4_K_M",
            prompt_file: "math.txt",
            prompt: "What is 2+2?",
            request_payload: &payload,
            raw_response: &raw,
            run_number: 2,
        })
        .unwrap();

    // Session directory is created on demand
    assert!(session_dir.is_dir());

    let name = file_name(&artifacts.request);
    assert!(name.ends_with("_llamacpp_unsloth_Qwen3-8B_Q4_K_M_math_run2.req"), "{}", name);
    assert!(file_name(&artifacts.raw_response).ends_with("_math_run2.res.json"));

    let request: Value = serde_json::from_str(&fs::read_to_string(&artifacts.request).unwrap()).unwrap();
    assert_eq!(request["backend"], "llamacpp");
    assert_eq!(request["model"], "unsloth/Qwen3-8B:Q4_K_M");
    assert_eq!(request["prompt_file"], "math.txt");
    assert_eq!(request["run_number"], 2);
    assert_eq!(request["payload"], payload);
    assert_eq!(request["prompt"], "What is 2+2?");
    assert!(request["timestamp"].is_string());

    assert_eq!(fs::read_to_string(&artifacts.raw_response).unwrap(), raw);

    let rendered_path = artifacts.rendered.expect("rendering should succeed");
    assert!(file_name(&rendered_path).ends_with("_math_run2.res.md"));
    let rendered = fs::read_to_string(rendered_path).unwrap();
    let reasoning_at = rendered.find("## Reasoning").unwrap();
    let step_at = rendered.find("step1").unwrap();
    let answer_heading_at = rendered.find("## Answer").unwrap();
    let answer_at = rendered.find("answer").unwrap();
    assert!(reasoning_at < step_at && step_at < answer_heading_at && answer_heading_at < answer_at);
}

#[test]
fn test_thinking_field_is_rendered_as_reasoning() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = RunRecorder::new(dir.path());
    let payload = json!({});
    let raw = json!({
        "choices": [{"message": {"reasoning_content": "", "thinking": "hmm", "content": "done"}}],
        "usage": {"completion_tokens": 2}
    })
        .to_string();

    let artifacts = recorder
        .record(&RunRecord {
            backend: BackendKind::LmStudio,
            model: "m",
            prompt_file: "p.txt",
            prompt: "p",
            request_payload: &payload,
            raw_response: &raw,
            run_number: 1,
        })
        .unwrap();

    let rendered = fs::read_to_string(artifacts.rendered.unwrap()).unwrap();
    assert!(rendered.find("hmm").unwrap() < rendered.find("done").unwrap());
    assert!(rendered.contains("## Reasoning"));
}

#[test]
fn test_ollama_rendering_is_plain_response() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = RunRecorder::new(dir.path());
    let payload = json!({"model": "llama3.2:3b", "prompt": "hi", "stream": false});
    let raw = json!({"response": "Hello there!", "eval_count": 3}).to_string();

    let artifacts = recorder
        .record(&RunRecord {
            backend: BackendKind::Ollama,
            model: "llama3.2:3b",
            prompt_file: "greeting.txt",
            prompt: "hi",
            request_payload: &payload,
            raw_response: &raw,
            run_number: 1,
        })
        .unwrap();

    assert!(file_name(&artifacts.request).contains("_ollama_llama3.2_3b_greeting_run1"));
    assert_eq!(fs::read_to_string(artifacts.rendered.unwrap()).unwrap(), "Hello there!");
}

#[test]
fn test_unrenderable_response_still_keeps_raw_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = RunRecorder::new(dir.path());
    let payload = json!({"model": "m"});
    let raw = "upstream proxy said no".to_string();

    let artifacts = recorder
        .record(&RunRecord {
            backend: BackendKind::LmStudio,
            model: "m",
            prompt_file: "p.txt",
            prompt: "p",
            request_payload: &payload,
            raw_response: &raw,
            run_number: 3,
        })
        .unwrap();

    assert!(artifacts.rendered.is_err());
    assert!(artifacts.request.exists());
    assert_eq!(fs::read_to_string(&artifacts.raw_response).unwrap(), raw);
    let md_files = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".res.md"))
        .count();
    assert_eq!(md_files, 0);
}
