//! # Prompt Catalog
//!
//! Every `*.txt` file in the prompts directory is one prompt. Files are read
//! again each time a prompt is needed, so edits show up without a restart.

use crate::error::BenchError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROMPT_EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
pub struct PromptCatalog {
    dir: PathBuf,
}

impl PromptCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted prompt file names; empty when the directory is missing.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %self.dir.display(), error = %err, "Prompt directory not readable");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(PROMPT_EXTENSION))
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }

    /// Prompt text with surrounding whitespace stripped.
    pub fn load(&self, name: &str) -> Result<String, BenchError> {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text.trim().to_string()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(BenchError::PromptNotFound(path)),
            Err(err) => Err(err.into()),
        }
    }
}

/// File name without its extension, used as a label in reports and artifact names
pub fn prompt_label(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_story.txt"), "b").unwrap();
        fs::write(dir.path().join("a_code.txt"), "a").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let catalog = PromptCatalog::new(dir.path());
        assert_eq!(catalog.list(), vec!["a_code.txt", "b_story.txt"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PromptCatalog::new(dir.path().join("prompts"));
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn test_load_trims_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("p1.txt"), "\n  hello world \n\n").unwrap();

        let catalog = PromptCatalog::new(dir.path());
        assert_eq!(catalog.load("p1.txt").unwrap(), "hello world");
    }

    #[test]
    fn test_load_missing_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PromptCatalog::new(dir.path());

        let err = catalog.load("gone.txt").unwrap_err();
        assert!(matches!(err, BenchError::PromptNotFound(path) if path.ends_with("gone.txt")));
    }

    #[test]
    fn test_prompt_label() {
        assert_eq!(prompt_label("long_context.txt"), "long_context");
        assert_eq!(prompt_label("plain"), "plain");
    }
}
