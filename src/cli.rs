use crate::benchmark::{ResultsLog, Session};
use crate::config::ConfigStore;
use clap::Parser;
use std::path::PathBuf;

/// # Command Line and Environment
///
/// File locations and log level. Every option has an environment fallback and
/// a default, so the tool runs without any arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "llm-bench")]
#[command(about = "Measure generation speed (tokens/second) of local Ollama, llama.cpp and LM Studio servers")]
#[command(version)]
pub struct Cli {
    /// Settings file (default: ~/.llm-benchmark-config.json)
    #[arg(long, env = "LLM_BENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the *.txt prompt files
    #[arg(long, env = "LLM_BENCH_PROMPTS_DIR", default_value = "prompts")]
    pub prompts_dir: PathBuf,

    /// Append-only results log
    #[arg(long, env = "LLM_BENCH_RESULTS_FILE")]
    pub results_file: Option<PathBuf>,

    /// Root for per-session artifact directories (default: <temp dir>/llm-benchmark)
    #[arg(long, env = "LLM_BENCH_SESSIONS_DIR")]
    pub sessions_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace) or a full filter directive
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Parse arguments after loading `.env`, then install logging.
    pub fn parse_args() -> Self {
        // Load .env file if it exists (ignore errors if file doesn't exist)
        let _ = dotenv::dotenv();

        let cli = Self::parse();
        cli.setup_logging();
        cli
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ConfigStore::default_path)
    }

    pub fn results_path(&self) -> PathBuf {
        self.results_file.clone().unwrap_or_else(ResultsLog::default_path)
    }

    pub fn sessions_root(&self) -> PathBuf {
        self.sessions_dir.clone().unwrap_or_else(Session::default_root)
    }

    /// Logs go to stderr and default to `warn`, so they stay out of the menus.
    fn setup_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(&self.log_level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unset(var: &str) -> bool {
        std::env::var_os(var).is_none()
    }

    #[test]
    fn test_defaults_without_arguments() {
        let cli = Cli::try_parse_from(["llm-bench"]).unwrap();

        // Only defaults not overridden from the environment are checked
        if unset("LLM_BENCH_PROMPTS_DIR") {
            assert_eq!(cli.prompts_dir, PathBuf::from("prompts"));
        }
        if unset("LLM_BENCH_CONFIG") {
            assert!(cli.config_path().ends_with(".llm-benchmark-config.json"));
        }
        if unset("LLM_BENCH_SESSIONS_DIR") {
            assert!(cli.sessions_root().ends_with("llm-benchmark"));
        }
        if unset("LLM_BENCH_RESULTS_FILE") {
            assert_eq!(cli.results_path(), PathBuf::from("results.txt"));
        }
        if unset("RUST_LOG") {
            assert_eq!(cli.log_level, "warn");
        }
    }

    #[test]
    fn test_explicit_locations() {
        let cli = Cli::try_parse_from([
            "llm-bench",
            "--config",
            "/tmp/bench.json",
            "--results-file",
            "out/results.txt",
            "--sessions-dir",
            "/tmp/sessions",
        ])
        .unwrap();

        assert_eq!(cli.config_path(), PathBuf::from("/tmp/bench.json"));
        assert_eq!(cli.results_path(), PathBuf::from("out/results.txt"));
        assert_eq!(cli.sessions_root(), PathBuf::from("/tmp/sessions"));
    }
}
