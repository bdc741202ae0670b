//! # Benchmark Orchestration
//!
//! Runs every selected model against every selected prompt, one iteration at
//! a time, and keeps three records up to date:
//!
//! - per-iteration artifacts in the session directory ([`RunRecorder`])
//! - the session's ranked summary, rewritten after every pair
//! - the master results log, appended after every pair and never truncated
//!
//! Nothing here runs concurrently. Order is model (outer), prompt, iteration
//! (inner), and each iteration waits for the previous one to finish.

use crate::adapters::{BackendClient, BackendKind};
use crate::config::{BenchConfig, SamplingParams};
use crate::error::BenchError;
use crate::graceful_shutdown::GracefulShutdown;
use crate::prompts::PromptCatalog;
use crate::recorder::{RunRecord, RunRecorder};
use crate::report::{render_ranking, PairReport, RunResult, SummaryRow};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the ranked summary inside each session directory
pub const SUMMARY_FILE_NAME: &str = "performance_summary.txt";

/// Lines of the prompt shown before a pair starts
const PROMPT_HEADER_LINES: usize = 10;

/// One batch of testing with its own artifact directory.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    dir: PathBuf,
}

impl Session {
    /// `<system temp dir>/llm-benchmark`
    pub fn default_root() -> PathBuf {
        std::env::temp_dir().join("llm-benchmark")
    }

    /// Create a fresh session directory named after the current local time.
    ///
    /// A suffix is added when a session with the same second already exists.
    pub fn create(root: &Path) -> Result<Self, BenchError> {
        fs::create_dir_all(root)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let mut id = stamp.clone();
        let mut attempt = 1;
        loop {
            let dir = root.join(&id);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    info!(session = %id, dir = %dir.display(), "Session started");
                    return Ok(Self { id, dir });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                    id = format!("{}_{}", stamp, attempt);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE_NAME)
    }
}

/// Ranked rows of one session, kept sorted by average throughput, best first.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    backend: BackendKind,
    session_id: String,
    path: PathBuf,
    rows: Vec<SummaryRow>,
}

impl SessionSummary {
    pub fn new(backend: BackendKind, session: &Session) -> Self {
        Self {
            backend,
            session_id: session.id().to_string(),
            path: session.summary_path(),
            rows: Vec::new(),
        }
    }

    /// Insert or replace the row for (model, prompt) and restore the ordering.
    pub fn upsert(&mut self, row: SummaryRow) {
        match self
            .rows
            .iter_mut()
            .find(|r| r.model == row.model && r.prompt_file == row.prompt_file)
        {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
        self.rows
            .sort_by(|a, b| b.avg_throughput.total_cmp(&a.avg_throughput));
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self) -> String {
        let title = format!(
            "PERFORMANCE SUMMARY - {} - session {}",
            self.backend.name().to_uppercase(),
            self.session_id
        );
        render_ranking(&title, &self.rows)
    }

    /// Rewrite the summary file with the current ranking
    pub fn write(&self) -> Result<(), BenchError> {
        fs::write(&self.path, self.render())?;
        Ok(())
    }
}

/// Append-only log of every completed pair, across all sessions.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `./results.txt`
    pub fn default_path() -> PathBuf {
        PathBuf::from("results.txt")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, report: &PairReport) -> Result<(), BenchError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(report.render_log_block().as_bytes())?;
        Ok(())
    }
}

/// Asked before each pair starts; `Ok(false)` skips the pair.
///
/// An interrupt error stops the batch.
pub trait PairGate: Send + Sync {
    fn approve(&self, model: &str, prompt_file: &str) -> Result<bool, BenchError>;
}

/// Result of a whole batch.
#[derive(Debug)]
pub struct SessionOutcome {
    pub session: Session,
    pub summary: SessionSummary,
    /// Pairs that produced a summary row
    pub pairs_completed: usize,
    /// Pairs whose iterations all failed, or whose prompt could not be read
    pub pairs_failed: usize,
    /// Pairs the gate declined
    pub pairs_skipped: usize,
    /// The operator stopped the batch early
    pub interrupted: bool,
}

/// Drives one backend through a batch of (model, prompt) pairs.
pub struct BenchmarkRunner<'a, B: BackendClient> {
    backend: &'a B,
    catalog: &'a PromptCatalog,
    results_log: &'a ResultsLog,
    iterations: u32,
    sampling: SamplingParams,
    shutdown: GracefulShutdown,
    gate: Option<&'a dyn PairGate>,
}

impl<'a, B: BackendClient> BenchmarkRunner<'a, B> {
    pub fn new(
        backend: &'a B,
        config: &BenchConfig,
        catalog: &'a PromptCatalog,
        results_log: &'a ResultsLog,
        shutdown: GracefulShutdown,
    ) -> Self {
        Self {
            backend,
            catalog,
            results_log,
            iterations: config.test_iterations,
            sampling: config.sampling(),
            shutdown,
            gate: None,
        }
    }

    /// Ask `gate` before every pair instead of running them all unattended.
    pub fn with_gate(mut self, gate: &'a dyn PairGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Run every model against every prompt inside `session`.
    pub async fn run_session(&self, session: Session, models: &[String], prompts: &[String]) -> SessionOutcome {
        let recorder = RunRecorder::new(session.dir());
        let mut summary = SessionSummary::new(self.backend.kind(), &session);
        let mut pairs_completed = 0;
        let mut pairs_failed = 0;
        let mut pairs_skipped = 0;
        let mut interrupted = false;

        'models: for model in models {
            for prompt_file in prompts {
                if self.shutdown.is_shutdown_initiated() {
                    interrupted = true;
                    break 'models;
                }

                // Re-read on every pair so edits between pairs are picked up
                let prompt = match self.catalog.load(prompt_file) {
                    Ok(prompt) => prompt,
                    Err(e) => {
                        println!("❌ Could not load {}: {}", prompt_file, e);
                        warn!(prompt = %prompt_file, "Prompt unreadable: {}", e);
                        pairs_failed += 1;
                        continue;
                    }
                };

                print_pair_header(model, prompt_file, &prompt);

                match self.gate.map(|gate| gate.approve(model, prompt_file)) {
                    None => println!("\n⏩ Auto-running (all selected)..."),
                    Some(Ok(true)) => {}
                    Some(Ok(false)) => {
                        println!("⏭️  Skipped");
                        pairs_skipped += 1;
                        continue;
                    }
                    Some(Err(e)) if e.is_interrupt() => {
                        interrupted = true;
                        break 'models;
                    }
                    Some(Err(e)) => {
                        warn!(model = %model, prompt = %prompt_file, "Start prompt failed, skipping pair: {}", e);
                        pairs_skipped += 1;
                        continue;
                    }
                }

                match self.run_pair(&recorder, model, prompt_file, &prompt).await {
                    Ok(Some(report)) => {
                        pairs_completed += 1;
                        summary.upsert(SummaryRow::from(&report));
                        if let Err(e) = summary.write() {
                            warn!(path = %summary.path().display(), "Could not write session summary: {}", e);
                        }
                        if let Err(e) = self.results_log.append(&report) {
                            warn!(path = %self.results_log.path().display(), "Could not append to results log: {}", e);
                        }
                    }
                    Ok(None) => pairs_failed += 1,
                    Err(_) => {
                        println!("\n⏹️  Benchmark interrupted");
                        interrupted = true;
                        break 'models;
                    }
                }
            }
        }

        if !summary.rows().is_empty() {
            println!("\n{}", summary.render());
        }
        info!(
            session = %session.id(),
            completed = pairs_completed,
            failed = pairs_failed,
            skipped = pairs_skipped,
            interrupted = interrupted,
            "Session finished"
        );

        SessionOutcome {
            session,
            summary,
            pairs_completed,
            pairs_failed,
            pairs_skipped,
            interrupted,
        }
    }

    /// Run the configured number of iterations for one pair.
    ///
    /// Failed iterations are reported and skipped. Returns `Ok(None)` when no
    /// iteration succeeded and `Err(BenchError::Interrupted)` on shutdown.
    pub async fn run_pair(
        &self,
        recorder: &RunRecorder,
        model: &str,
        prompt_file: &str,
        prompt: &str,
    ) -> Result<Option<PairReport>, BenchError> {
        let backend_name = self.backend.kind().name();
        let mut runs = Vec::with_capacity(self.iterations as usize);

        println!("\n🔄 Testing {}...", model);
        println!("🔁 Iterations: {}\n", self.iterations);

        for run_number in 1..=self.iterations {
            if self.shutdown.is_shutdown_initiated() {
                return Err(BenchError::Interrupted);
            }

            let outcome = tokio::select! {
                result = self.backend.complete(model, prompt, &self.sampling) => result,
                _ = self.shutdown.cancelled() => return Err(BenchError::Interrupted),
            };

            let completion = match outcome {
                Ok(completion) => completion,
                Err(e) => {
                    println!("  Run {}: ❌ Error - {}", run_number, e);
                    warn!(backend = backend_name, model = model, run = run_number, "Iteration failed: {}", e);
                    continue;
                }
            };

            let run = RunResult::new(completion.elapsed_secs(), completion.output_tokens);
            println!("  Run {}: {}", run_number, run.describe());

            let record = RunRecord {
                backend: self.backend.kind(),
                model,
                prompt_file,
                prompt,
                request_payload: &completion.request_payload,
                raw_response: &completion.raw_response,
                run_number,
            };
            if let Err(e) = recorder.record(&record) {
                warn!(backend = backend_name, model = model, run = run_number, "Could not save run artifacts: {}", e);
            }

            runs.push(run);
        }

        if runs.is_empty() {
            println!("\n⚠️  No successful runs for {} on {}", model, prompt_file);
            return Ok(None);
        }

        let report = PairReport {
            backend: self.backend.kind(),
            model: model.to_string(),
            prompt_file: prompt_file.to_string(),
            prompt: prompt.to_string(),
            iterations: self.iterations,
            runs,
            finished_at: Local::now(),
        };
        println!("\n✅ Average: {:.2} tok/s", report.avg_throughput());
        Ok(Some(report))
    }
}

fn print_pair_header(model: &str, prompt_file: &str, prompt: &str) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("Model: {}", model);
    println!("Prompt: {}", prompt_file);
    println!("{}", rule);
    println!("\n📝 First {} lines of prompt:", PROMPT_HEADER_LINES);
    println!("{}", "-".repeat(60));
    let mut lines = prompt.split('\n');
    for line in lines.by_ref().take(PROMPT_HEADER_LINES) {
        println!("{}", line);
    }
    if lines.next().is_some() {
        println!("...");
    }
    println!("{}", "-".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(model: &str, prompt: &str, tps: f64) -> SummaryRow {
        SummaryRow {
            model: model.to_string(),
            prompt_file: prompt.to_string(),
            avg_throughput: tps,
        }
    }

    #[test]
    fn test_summary_sorted_descending() {
        let root = tempfile::tempdir().unwrap();
        let session = Session::create(root.path()).unwrap();
        let mut summary = SessionSummary::new(BackendKind::Ollama, &session);

        summary.upsert(row("m1", "a.txt", 5.0));
        summary.upsert(row("m2", "a.txt", 12.0));
        summary.upsert(row("m3", "a.txt", 8.0));

        let order: Vec<&str> = summary.rows().iter().map(|r| r.model.as_str()).collect();
        assert_eq!(order, vec!["m2", "m3", "m1"]);
    }

    #[test]
    fn test_summary_upsert_replaces_pair() {
        let root = tempfile::tempdir().unwrap();
        let session = Session::create(root.path()).unwrap();
        let mut summary = SessionSummary::new(BackendKind::LlamaCpp, &session);

        summary.upsert(row("m1", "a.txt", 5.0));
        summary.upsert(row("m1", "b.txt", 6.0));
        summary.upsert(row("m1", "a.txt", 9.0));

        assert_eq!(summary.rows().len(), 2);
        assert_eq!(summary.rows()[0], row("m1", "a.txt", 9.0));
    }

    #[test]
    fn test_sessions_get_fresh_directories() {
        let root = tempfile::tempdir().unwrap();
        let first = Session::create(root.path()).unwrap();
        let second = Session::create(root.path()).unwrap();

        assert_ne!(first.dir(), second.dir());
        assert!(first.dir().is_dir());
        assert!(second.dir().is_dir());
        assert_eq!(first.summary_path(), first.dir().join(SUMMARY_FILE_NAME));
    }
}
