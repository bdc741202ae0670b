//! # Benchmark Settings
//!
//! The persisted settings object: backend URLs, iteration count, sampling
//! parameters and the generation timeout. Stored as one flat JSON object in
//! the user's home directory and rewritten wholesale on every save.
//!
//! Loading never fails. Keys missing from the file are filled from
//! [`BenchConfig::default`], keys the tool does not know are kept and written
//! back, and a missing or corrupt file degrades to the defaults.

use crate::adapters::BackendKind;
use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// File name of the settings file inside the home directory
pub const CONFIG_FILE_NAME: &str = ".llm-benchmark-config.json";

/// Persisted settings, passed explicitly to every operation that needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    // =============================================================================
    // BACKEND URLS
    // =============================================================================
    pub ollama_url: String,
    pub llamacpp_url: String,
    pub lmstudio_url: String,

    // =============================================================================
    // BENCHMARK PARAMETERS
    // =============================================================================
    /// Runs per (model, prompt) pair
    pub test_iterations: u32,
    /// Timeout for a single generation call in seconds, 0 disables it
    pub request_timeout_secs: u64,

    // =============================================================================
    // SAMPLING (OpenAI-compatible backends only)
    // =============================================================================
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub repeat_penalty: f32,

    /// Keys present in the file that this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            llamacpp_url: "http://localhost:8080".to_string(),
            lmstudio_url: "http://localhost:1234".to_string(),
            test_iterations: 3,
            request_timeout_secs: 600,
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 0.9,
            repeat_penalty: 1.1,
            extra: Map::new(),
        }
    }
}

/// Sampling fields sent with every OpenAI-compatible chat completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        BenchConfig::default().sampling()
    }
}

/// Editable settings, in menu order.
pub const SETTING_KEYS: [&str; 9] = [
    "ollama_url",
    "llamacpp_url",
    "lmstudio_url",
    "test_iterations",
    "temperature",
    "max_tokens",
    "top_p",
    "repeat_penalty",
    "request_timeout_secs",
];

impl BenchConfig {
    /// Base URL configured for a backend
    pub fn url_for(&self, kind: BackendKind) -> &str {
        match kind {
            BackendKind::Ollama => &self.ollama_url,
            BackendKind::LlamaCpp => &self.llamacpp_url,
            BackendKind::LmStudio => &self.lmstudio_url,
        }
    }

    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            repeat_penalty: self.repeat_penalty,
        }
    }

    /// Generation timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Current value of an editable setting, rendered for display.
    pub fn display_value(&self, key: &str) -> Option<String> {
        let value = match key {
            "ollama_url" => self.ollama_url.clone(),
            "llamacpp_url" => self.llamacpp_url.clone(),
            "lmstudio_url" => self.lmstudio_url.clone(),
            "test_iterations" => self.test_iterations.to_string(),
            "temperature" => self.temperature.to_string(),
            "max_tokens" => self.max_tokens.to_string(),
            "top_p" => self.top_p.to_string(),
            "repeat_penalty" => self.repeat_penalty.to_string(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Parse `raw` into the setting named `key` and apply it.
    ///
    /// The config is left untouched when the value does not parse or would make
    /// the config invalid.
    pub fn apply_setting(&mut self, key: &str, raw: &str) -> Result<(), BenchError> {
        let raw = raw.trim();
        let mut updated = self.clone();
        match key {
            "ollama_url" => updated.ollama_url = normalize_url(raw)?,
            "llamacpp_url" => updated.llamacpp_url = normalize_url(raw)?,
            "lmstudio_url" => updated.lmstudio_url = normalize_url(raw)?,
            "test_iterations" => updated.test_iterations = parse_number(key, raw)?,
            "temperature" => updated.temperature = parse_number(key, raw)?,
            "max_tokens" => updated.max_tokens = parse_number(key, raw)?,
            "top_p" => updated.top_p = parse_number(key, raw)?,
            "repeat_penalty" => updated.repeat_penalty = parse_number(key, raw)?,
            "request_timeout_secs" => updated.request_timeout_secs = parse_number(key, raw)?,
            _ => return Err(BenchError::InvalidSetting(format!("Unknown setting '{}'", key))),
        }
        updated.validate().map_err(BenchError::InvalidSetting)?;
        *self = updated;
        Ok(())
    }

    /// Validate configuration values and provide helpful error messages.
    pub fn validate(&self) -> Result<(), String> {
        for kind in BackendKind::ALL {
            let raw = self.url_for(kind);
            let url = Url::parse(raw)
                .map_err(|err| format!("Invalid {} URL '{}': {}", kind.label(), raw, err))?;
            if !["http", "https"].contains(&url.scheme()) {
                return Err(format!(
                    "Invalid URL scheme '{}' for {}. Only 'http' and 'https' are supported.",
                    url.scheme(),
                    kind.label()
                ));
            }
            if url.host().is_none() {
                return Err(format!("{} URL must include a host (e.g., 'http://localhost:8080').", kind.label()));
            }
        }

        if self.test_iterations == 0 {
            return Err("Iterations must be greater than 0.".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("Temperature {} is outside 0.0-2.0.", self.temperature));
        }
        if self.max_tokens == 0 {
            return Err("Max tokens must be greater than 0.".to_string());
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(format!("Top-p {} is outside 0.0-1.0.", self.top_p));
        }
        if self.repeat_penalty <= 0.0 {
            return Err("Repeat penalty must be greater than 0.".to_string());
        }

        Ok(())
    }
}

fn normalize_url(raw: &str) -> Result<String, BenchError> {
    let trimmed = raw.trim_end_matches('/');
    Url::parse(trimmed)?;
    Ok(trimmed.to_string())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, BenchError> {
    raw.parse::<T>()
        .map_err(|_| BenchError::InvalidSetting(format!("'{}' is not a valid value for {}", raw, key)))
}

/// Overlay file keys on the defaults one at a time.
///
/// A key whose value has the wrong type or fails validation keeps its
/// default, so one bad entry never costs the rest of the file.
fn merge_with_defaults(file_keys: Map<String, Value>, path: &Path) -> BenchConfig {
    let mut merged = match serde_json::to_value(BenchConfig::default()) {
        Ok(Value::Object(map)) => map,
        _ => return BenchConfig::default(),
    };

    for (key, value) in file_keys {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value);

        let verdict = serde_json::from_value::<BenchConfig>(Value::Object(candidate.clone()))
            .map_err(|err| err.to_string())
            .and_then(|config| config.validate());
        match verdict {
            Ok(()) => merged = candidate,
            Err(problem) => {
                warn!(path = %path.display(), setting = %key, "Keeping default for setting: {}", problem);
            }
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

/// Loads and saves [`BenchConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.llm-benchmark-config.json`, or the current directory when no home is known
    pub fn default_path() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, merging defaults for missing or invalid keys.
    pub fn load(&self) -> BenchConfig {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return BenchConfig::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Unreadable settings file, using defaults");
                return BenchConfig::default();
            }
        };

        let file_keys = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %self.path.display(), "Settings file is not a JSON object, using defaults");
                return BenchConfig::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Corrupt settings file, using defaults");
                return BenchConfig::default();
            }
        };

        merge_with_defaults(file_keys, &self.path)
    }

    /// Write the settings, replacing any previous content.
    pub fn save(&self, config: &BenchConfig) -> Result<(), BenchError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BenchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_keys_come_from_defaults() {
        let config: BenchConfig =
            serde_json::from_str(r#"{"ollama_url": "http://gpu-box:11434", "test_iterations": 5}"#).unwrap();

        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.test_iterations, 5);
        assert_eq!(config.llamacpp_url, "http://localhost:8080");
        assert_eq!(config.max_tokens, 2048);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_survive() {
        let config: BenchConfig = serde_json::from_str(r#"{"theme": "dark"}"#).unwrap();
        assert_eq!(config.extra.get("theme"), Some(&Value::String("dark".into())));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["test_iterations"], 3);
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = BenchConfig::default();

        assert!(config.apply_setting("test_iterations", "0").is_err());
        assert!(config.apply_setting("test_iterations", "many").is_err());
        assert!(config.apply_setting("ollama_url", "not a url").is_err());
        assert!(config.apply_setting("top_p", "1.5").is_err());
        assert!(config.apply_setting("colour", "blue").is_err());
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_apply_setting_updates_value() {
        let mut config = BenchConfig::default();

        config.apply_setting("test_iterations", " 7 ").unwrap();
        config.apply_setting("lmstudio_url", "http://10.0.0.5:1234/").unwrap();
        config.apply_setting("request_timeout_secs", "0").unwrap();

        assert_eq!(config.test_iterations, 7);
        assert_eq!(config.lmstudio_url, "http://10.0.0.5:1234");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_display_value_covers_every_setting() {
        let config = BenchConfig::default();
        for key in SETTING_KEYS {
            assert!(config.display_value(key).is_some(), "{} has no display value", key);
        }
        assert_eq!(config.display_value("test_iterations").as_deref(), Some("3"));
    }
}
