//! # Report Formatting
//!
//! Per-run measurements, per-pair aggregates and the text blocks written to
//! the master results log and the session summary.

use crate::adapters::BackendKind;
use chrono::{DateTime, Local};
use std::fmt::Write as _;

const RULE_WIDTH: usize = 80;
const PREVIEW_HEAD_LINES: usize = 5;
const PREVIEW_TAIL_LINES: usize = 5;

/// One completed iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub elapsed_secs: f64,
    pub tokens: u64,
    /// Tokens per second, 0 when no time elapsed
    pub throughput: f64,
}

impl RunResult {
    pub fn new(elapsed_secs: f64, tokens: u64) -> Self {
        let throughput = if elapsed_secs > 0.0 {
            tokens as f64 / elapsed_secs
        } else {
            0.0
        };
        Self {
            elapsed_secs,
            tokens,
            throughput,
        }
    }

    /// `{tps} tok/s ({tokens} tokens in {elapsed}s)`
    pub fn describe(&self) -> String {
        format!(
            "{:.2} tok/s ({} tokens in {:.2}s)",
            self.throughput, self.tokens, self.elapsed_secs
        )
    }
}

/// Rough token estimate: four characters per token.
pub fn approx_token_count(text: &str) -> usize {
    text.chars().count() / 4
}

/// Size figures printed in the results log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptStats {
    pub chars: usize,
    pub lines: usize,
    pub approx_tokens: usize,
}

impl PromptStats {
    pub fn of(prompt: &str) -> Self {
        Self {
            chars: prompt.chars().count(),
            lines: prompt.split('\n').count(),
            approx_tokens: approx_token_count(prompt),
        }
    }
}

/// Whole prompt when short, otherwise its first and last five lines around an
/// omission marker.
pub fn format_prompt_preview(prompt: &str) -> String {
    let lines: Vec<&str> = prompt.split('\n').collect();
    let shown = PREVIEW_HEAD_LINES + PREVIEW_TAIL_LINES;
    if lines.len() <= shown {
        return prompt.to_string();
    }

    format!(
        "{}\n\n... ({} lines omitted) ...\n\n{}",
        lines[..PREVIEW_HEAD_LINES].join("\n"),
        lines.len() - shown,
        lines[lines.len() - PREVIEW_TAIL_LINES..].join("\n"),
    )
}

/// Everything recorded about one (model, prompt) pair.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub backend: BackendKind,
    pub model: String,
    pub prompt_file: String,
    pub prompt: String,
    /// Configured iteration count, failed runs included
    pub iterations: u32,
    /// Successful runs only
    pub runs: Vec<RunResult>,
    pub finished_at: DateTime<Local>,
}

impl PairReport {
    pub fn avg_throughput(&self) -> f64 {
        mean(self.runs.iter().map(|r| r.throughput))
    }

    pub fn avg_elapsed_secs(&self) -> f64 {
        mean(self.runs.iter().map(|r| r.elapsed_secs))
    }

    pub fn total_tokens(&self) -> u64 {
        self.runs.iter().map(|r| r.tokens).sum()
    }

    /// Block appended to the master results log.
    pub fn render_log_block(&self) -> String {
        let stats = PromptStats::of(&self.prompt);
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{}", heavy);
        let _ = writeln!(out, "TEST REPORT - {}", self.finished_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "{}\n", heavy);

        let _ = writeln!(out, "Backend: {}", self.backend.name().to_uppercase());
        let _ = writeln!(out, "Model: {}", self.model);
        let _ = writeln!(out, "Prompt File: {}", self.prompt_file);
        let _ = writeln!(
            out,
            "Prompt Stats: {} chars, {} lines, ~{} tokens",
            stats.chars, stats.lines, stats.approx_tokens
        );
        let _ = writeln!(out, "Iterations: {}\n", self.iterations);

        let _ = writeln!(out, "PROMPT PREVIEW:");
        let _ = writeln!(out, "{}", light);
        let _ = writeln!(out, "{}", format_prompt_preview(&self.prompt));
        let _ = writeln!(out, "{}\n", light);

        let _ = writeln!(out, "RESULTS:");
        for (i, run) in self.runs.iter().enumerate() {
            let _ = writeln!(out, "  Run {}: {}", i + 1, run.describe());
        }

        if !self.runs.is_empty() {
            let _ = writeln!(out, "\nAVERAGE: {:.2} tok/s", self.avg_throughput());
            let _ = writeln!(out, "AVG TIME: {:.2}s", self.avg_elapsed_secs());
            let _ = writeln!(out, "TOTAL OUTPUT TOKENS: {}", self.total_tokens());
        }

        out.push_str("\n\n");
        out
    }
}

/// One line of a session's ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub model: String,
    pub prompt_file: String,
    pub avg_throughput: f64,
}

impl From<&PairReport> for SummaryRow {
    fn from(report: &PairReport) -> Self {
        Self {
            model: report.model.clone(),
            prompt_file: report.prompt_file.clone(),
            avg_throughput: report.avg_throughput(),
        }
    }
}

/// Ranked table, rows in the order given.
pub fn render_ranking(title: &str, rows: &[SummaryRow]) -> String {
    let model_width = column_width(rows.iter().map(|r| r.model.as_str()), "Model");
    let prompt_width = column_width(rows.iter().map(|r| r.prompt_file.as_str()), "Prompt");
    let width = 6 + model_width + 2 + prompt_width + 2 + 12;
    let mut out = String::new();

    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(width));
    let _ = writeln!(
        out,
        "{:<6}{:<mw$}  {:<pw$}  {:>12}",
        "Rank",
        "Model",
        "Prompt",
        "Avg tok/s",
        mw = model_width,
        pw = prompt_width
    );
    let _ = writeln!(out, "{}", "-".repeat(width));
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<6}{:<mw$}  {:<pw$}  {:>12.2}",
            i + 1,
            row.model,
            row.prompt_file,
            row.avg_throughput,
            mw = model_width,
            pw = prompt_width
        );
    }
    out
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_zero_elapsed_means_zero_throughput() {
        assert_eq!(RunResult::new(0.0, 500).throughput, 0.0);
        assert_eq!(RunResult::new(-1.0, 5).throughput, 0.0);
        assert_eq!(RunResult::new(2.0, 20).throughput, 10.0);
    }

    #[test]
    fn test_approx_token_count() {
        assert_eq!(approx_token_count(""), 0);
        assert_eq!(approx_token_count("abc"), 0);
        assert_eq!(approx_token_count("abcd"), 1);
        assert_eq!(approx_token_count(&"x".repeat(4099)), 1024);
    }

    #[test]
    fn test_short_prompt_preview_is_whole_prompt() {
        let prompt = numbered_lines(10);
        assert_eq!(format_prompt_preview(&prompt), prompt);
        assert_eq!(format_prompt_preview("hello"), "hello");
    }

    #[test]
    fn test_long_prompt_preview_omits_middle() {
        let prompt = numbered_lines(23);
        let preview = format_prompt_preview(&prompt);

        let expected = format!(
            "{}\n\n... (13 lines omitted) ...\n\n{}",
            numbered_lines(5),
            (19..=23).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n")
        );
        assert_eq!(preview, expected);
    }

    #[test]
    fn test_prompt_stats() {
        let stats = PromptStats::of("hello\nworld!");
        assert_eq!(stats, PromptStats { chars: 12, lines: 2, approx_tokens: 3 });
    }

    #[test]
    fn test_log_block_totals() {
        let report = PairReport {
            backend: BackendKind::LmStudio,
            model: "qwen".to_string(),
            prompt_file: "p.txt".to_string(),
            prompt: "hi".to_string(),
            iterations: 3,
            runs: vec![RunResult::new(1.0, 30), RunResult::new(3.0, 30)],
            finished_at: Local::now(),
        };

        let block = report.render_log_block();
        assert!(block.contains("Backend: LMSTUDIO\n"));
        assert!(block.contains("Iterations: 3\n"));
        assert!(block.contains("  Run 2: 10.00 tok/s (30 tokens in 3.00s)\n"));
        assert!(block.contains("AVERAGE: 20.00 tok/s\n"));
        assert!(block.contains("AVG TIME: 2.00s\n"));
        assert!(block.contains("TOTAL OUTPUT TOKENS: 60\n"));
    }

    #[test]
    fn test_ranking_layout() {
        let rows = vec![
            SummaryRow { model: "fast".into(), prompt_file: "a.txt".into(), avg_throughput: 42.5 },
            SummaryRow { model: "slow".into(), prompt_file: "a.txt".into(), avg_throughput: 3.0 },
        ];
        let table = render_ranking("Ranking", &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Ranking");
        assert!(lines[4].starts_with("1     fast"));
        assert!(lines[4].ends_with("42.50"));
        assert!(lines[5].starts_with("2     slow"));
    }
}
