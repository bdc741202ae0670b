//! # llm_speedbench - Local LLM Throughput Benchmark
//!
//! Measures generation speed (output tokens per second) of local inference
//! servers by sending fixed prompts and timing non-streaming completions over
//! repeated runs.
//!
//! ## Features
//!
//! - **Three backends**: Ollama (native API), llama.cpp server and LM Studio (OpenAI-compatible)
//! - **Batch runs**: any set of models against any set of prompts, N iterations per pair
//! - **Durable results**: raw request/response artifacts per run, a live ranked
//!   summary per session, and an append-only master results log
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_speedbench::{
//!     Backend, BackendClient, BackendKind, BenchConfig, BenchmarkRunner, GracefulShutdown,
//!     PromptCatalog, ResultsLog, Session,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BenchConfig::default();
//!     let backend = Backend::for_kind(BackendKind::Ollama, &config)?;
//!     let models = backend.list_models().await;
//!
//!     let catalog = PromptCatalog::new("prompts");
//!     let log = ResultsLog::new("results.txt");
//!     let runner = BenchmarkRunner::new(&backend, &config, &catalog, &log, GracefulShutdown::new());
//!
//!     let session = Session::create(&Session::default_root())?;
//!     let outcome = runner.run_session(session, &models, &catalog.list()).await;
//!     println!("{}", outcome.summary.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - persisted settings and their store
//! - [`prompts`] - prompt catalog
//! - [`adapters`] - backend clients
//! - [`recorder`] - per-run artifacts
//! - [`report`] - measurements and report formatting
//! - [`benchmark`] - batch orchestration, session summary, results log

// Core infrastructure
pub mod core;
pub mod config;
pub mod error;
pub mod schemas;
pub mod graceful_shutdown;

// Domain modules
pub mod adapters;
pub mod benchmark;
pub mod prompts;
pub mod recorder;
pub mod report;

// Interactive front end
#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub mod ui;

// Re-export commonly used types for convenience
pub use adapters::{Backend, BackendClient, BackendKind, Completion};
pub use benchmark::{BenchmarkRunner, PairGate, ResultsLog, Session, SessionOutcome, SessionSummary};
pub use config::{BenchConfig, ConfigStore, SamplingParams};
pub use crate::core::http_client::{HttpClientBuilder, HttpClientConfig};
pub use error::BenchError;
pub use graceful_shutdown::{setup_shutdown_handler, GracefulShutdown};
pub use prompts::PromptCatalog;
pub use recorder::{RunArtifacts, RunRecord, RunRecorder};
pub use report::{PairReport, RunResult, SummaryRow};

/// The result type used throughout the library
pub type Result<T> = std::result::Result<T, BenchError>;
