use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the benchmark library.
///
/// Most of them never reach the operator as failures: listing errors degrade
/// to an empty model list and completion errors drop a single iteration.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Backend unreachable, timed out or answered with a non-success status
    #[error("Upstream error: {0}")]
    Upstream(String),
    /// Backend answered 2xx but the body lacks an expected field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Prompt not found: {}", .0.display())]
    PromptNotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
    /// Operator pressed Ctrl-C
    #[error("Interrupted by operator")]
    Interrupted,
}

impl BenchError {
    /// True for the operator-interrupt case, which callers treat as a clean shutdown.
    pub fn is_interrupt(&self) -> bool {
        match self {
            BenchError::Interrupted => true,
            BenchError::Io(err) => err.kind() == std::io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}

/// # From Trait Implementations for Better Error Handling
///
/// Classify HTTP client failures so the console log tells a dead server apart
/// from a slow one or a server that rejected the request.
impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BenchError::Upstream("Request timeout - backend did not respond in time".to_string())
        } else if err.is_connect() {
            BenchError::Upstream("Connection failed - unable to reach backend".to_string())
        } else if let Some(status) = err.status() {
            BenchError::Upstream(format!("HTTP {}: {}", status.as_u16(), err))
        } else if err.is_decode() {
            BenchError::MalformedResponse(format!("error decoding response body: {}", err))
        } else {
            BenchError::Upstream(format!("HTTP client error: {}", err))
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for BenchError {
    fn from(err: url::ParseError) -> Self {
        BenchError::InvalidSetting(format!("Invalid URL: {}", err))
    }
}

#[cfg(feature = "cli")]
impl From<dialoguer::Error> for BenchError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                BenchError::Interrupted
            }
            dialoguer::Error::IO(io) => BenchError::Io(io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_detection() {
        assert!(BenchError::Interrupted.is_interrupt());
        let io = std::io::Error::new(std::io::ErrorKind::Interrupted, "read interrupted");
        assert!(BenchError::Io(io).is_interrupt());
        assert!(!BenchError::Upstream("down".into()).is_interrupt());
    }

    #[test]
    fn test_display_messages() {
        let err = BenchError::PromptNotFound(PathBuf::from("prompts/missing.txt"));
        assert_eq!(err.to_string(), "Prompt not found: prompts/missing.txt");

        let err: BenchError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("Serialization error: JSON error"));
    }
}
