//! # Interactive Menus
//!
//! Terminal front end: main menu, backend / model / prompt selection and the
//! settings editor. All benchmark work is delegated to [`BenchmarkRunner`].
//!
//! Esc backs out of any menu. Ctrl-C inside a menu surfaces as
//! [`BenchError::Interrupted`] and ends the loop; the caller saves settings.

use crate::adapters::{Backend, BackendClient, BackendKind};
use crate::benchmark::{BenchmarkRunner, PairGate, ResultsLog, Session};
use crate::config::{BenchConfig, ConfigStore, SETTING_KEYS};
use crate::error::BenchError;
use crate::graceful_shutdown::GracefulShutdown;
use crate::prompts::PromptCatalog;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use std::path::PathBuf;
use tracing::{error, warn};

const ALL_MODELS: &str = "★ All models";
const ALL_PROMPTS: &str = "★ All prompts";

/// Options picked from a multi-select, and whether the "all" entry was used.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    values: Vec<String>,
    all: bool,
}

/// Asks before each pair: Enter starts it, Esc or "n" skips it.
struct ConfirmGate<'t> {
    theme: &'t ColorfulTheme,
}

impl PairGate for ConfirmGate<'_> {
    fn approve(&self, _model: &str, _prompt_file: &str) -> Result<bool, BenchError> {
        let answer = Confirm::with_theme(self.theme)
            .with_prompt("Start this test? (Esc skips)")
            .default(true)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }
}

enum MainChoice {
    Test(BackendKind),
    Settings,
    Exit,
}

/// Interactive application state. Settings are owned here and saved through
/// the [`ConfigStore`] after every change.
pub struct App {
    store: ConfigStore,
    config: BenchConfig,
    catalog: PromptCatalog,
    results_log: ResultsLog,
    sessions_root: PathBuf,
    shutdown: GracefulShutdown,
    theme: ColorfulTheme,
}

impl App {
    pub fn new(
        store: ConfigStore,
        config: BenchConfig,
        catalog: PromptCatalog,
        results_log: ResultsLog,
        sessions_root: PathBuf,
        shutdown: GracefulShutdown,
    ) -> Self {
        Self {
            store,
            config,
            catalog,
            results_log,
            sessions_root,
            shutdown,
            theme: ColorfulTheme::default(),
        }
    }

    /// Persist the current settings; failures are logged, never fatal.
    pub fn save_config(&self) {
        if let Err(e) = self.store.save(&self.config) {
            error!(path = %self.store.path().display(), "Could not save settings: {}", e);
            println!("❌ Could not save settings to {}: {}", self.store.path().display(), e);
        }
    }

    /// Main menu loop. Returns when the operator exits or interrupts.
    pub async fn run(&mut self) -> Result<(), BenchError> {
        loop {
            if self.shutdown.is_shutdown_initiated() {
                return Err(BenchError::Interrupted);
            }

            let result = match self.main_menu()? {
                MainChoice::Test(kind) => self.backend_menu(kind).await,
                MainChoice::Settings => self.settings_menu(),
                MainChoice::Exit => return Ok(()),
            };

            match result {
                Err(e) if e.is_interrupt() => return Err(e),
                Err(e) => {
                    println!("❌ {}", e);
                    self.pause()?;
                }
                Ok(()) => {}
            }
        }
    }

    fn main_menu(&self) -> Result<MainChoice, BenchError> {
        let mut items: Vec<String> = BackendKind::ALL
            .iter()
            .map(|kind| format!("Test {} models", kind.label()))
            .collect();
        items.push("Settings".to_string());
        items.push("Exit".to_string());

        let choice = Select::with_theme(&self.theme)
            .with_prompt("LLM Speed Benchmark Tool")
            .items(&items)
            .default(0)
            .interact_opt()?;

        Ok(match choice {
            Some(i) if i < BackendKind::ALL.len() => MainChoice::Test(BackendKind::ALL[i]),
            Some(i) if i == BackendKind::ALL.len() => MainChoice::Settings,
            _ => MainChoice::Exit,
        })
    }

    async fn backend_menu(&mut self, kind: BackendKind) -> Result<(), BenchError> {
        let backend = Backend::for_kind(kind, &self.config)
            .map_err(|e| BenchError::Upstream(e.to_string()))?;

        println!("🔍 Looking for {} models at {}...", kind.label(), backend.base_url());
        let models = backend.list_models().await;
        if self.shutdown.is_shutdown_initiated() {
            return Err(BenchError::Interrupted);
        }
        if models.is_empty() {
            println!(
                "❌ No models found or {} not running at {}",
                kind.label(),
                backend.base_url()
            );
            return self.pause();
        }

        let Some(model_pick) = self.pick_many(
            &format!("{} Benchmark - select models (SPACE to mark, ENTER to confirm)", kind.label()),
            ALL_MODELS,
            &models,
        )?
        else {
            return Ok(());
        };

        let prompts = self.catalog.list();
        if prompts.is_empty() {
            println!("❌ No prompts found in {}/", self.catalog.dir().display());
            return self.pause();
        }

        let Some(prompt_pick) = self.pick_many(
            "Select prompts (SPACE to mark, ENTER to confirm)",
            ALL_PROMPTS,
            &prompts,
        )?
        else {
            return Ok(());
        };

        let session = Session::create(&self.sessions_root)?;
        println!("📁 Session artifacts: {}", session.dir().display());

        let gate = ConfirmGate { theme: &self.theme };
        let mut runner = BenchmarkRunner::new(
            &backend,
            &self.config,
            &self.catalog,
            &self.results_log,
            self.shutdown.clone(),
        );
        // Picking every model runs unattended
        if !model_pick.all {
            runner = runner.with_gate(&gate);
        }
        let outcome = runner
            .run_session(session, &model_pick.values, &prompt_pick.values)
            .await;

        if outcome.interrupted {
            return Err(BenchError::Interrupted);
        }

        println!(
            "\n✅ Tests complete: {} pair(s) measured, {} without results, {} skipped.",
            outcome.pairs_completed, outcome.pairs_failed, outcome.pairs_skipped
        );
        println!("📄 Summary: {}", outcome.summary.path().display());
        println!("📄 Results log: {}", self.results_log.path().display());
        self.pause()
    }

    /// Multi-select with a leading "all" entry. `None` when nothing was picked
    /// or the operator pressed Esc.
    fn pick_many(&self, prompt: &str, all_label: &str, options: &[String]) -> Result<Option<Selection>, BenchError> {
        let mut items = Vec::with_capacity(options.len() + 1);
        items.push(all_label.to_string());
        items.extend(options.iter().cloned());

        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&items)
            .interact_opt()?;

        Ok(picked.and_then(|indices| resolve_selection(&indices, options)))
    }

    fn settings_menu(&mut self) -> Result<(), BenchError> {
        loop {
            let mut items: Vec<String> = SETTING_KEYS
                .iter()
                .map(|key| {
                    format!(
                        "{}: {}",
                        setting_label(key),
                        self.config.display_value(key).unwrap_or_default()
                    )
                })
                .collect();
            items.push("Back".to_string());

            let choice = Select::with_theme(&self.theme)
                .with_prompt("Settings")
                .items(&items)
                .default(0)
                .interact_opt()?;

            let key = match choice {
                Some(i) if i < SETTING_KEYS.len() => SETTING_KEYS[i],
                _ => break,
            };

            let raw: String = Input::with_theme(&self.theme)
                .with_prompt(format!("Enter {}", setting_label(key)))
                .with_initial_text(self.config.display_value(key).unwrap_or_default())
                .interact_text()?;

            match self.config.apply_setting(key, &raw) {
                Ok(()) => self.save_config(),
                Err(e) => {
                    warn!(setting = key, "Rejected setting: {}", e);
                    println!("❌ {}", e);
                    self.pause()?;
                }
            }
        }

        self.save_config();
        Ok(())
    }

    fn pause(&self) -> Result<(), BenchError> {
        let _: String = Input::with_theme(&self.theme)
            .with_prompt("Press Enter to continue")
            .allow_empty(true)
            .interact_text()?;
        Ok(())
    }
}

/// Map multi-select indices (index 0 being the "all" entry) to option values.
fn resolve_selection(indices: &[usize], options: &[String]) -> Option<Selection> {
    if indices.contains(&0) {
        return Some(Selection {
            values: options.to_vec(),
            all: true,
        });
    }
    let chosen: Vec<String> = indices
        .iter()
        .filter_map(|&i| options.get(i.checked_sub(1)?).cloned())
        .collect();
    if chosen.is_empty() {
        None
    } else {
        Some(Selection {
            values: chosen,
            all: false,
        })
    }
}

fn setting_label(key: &str) -> &'static str {
    match key {
        "ollama_url" => "Ollama URL",
        "llamacpp_url" => "llama.cpp URL",
        "lmstudio_url" => "LM Studio URL",
        "test_iterations" => "Iterations",
        "temperature" => "Temperature",
        "max_tokens" => "Max tokens",
        "top_p" => "Top-p",
        "repeat_penalty" => "Repeat penalty",
        "request_timeout_secs" => "Request timeout (s, 0 = none)",
        _ => "Setting",
    }
}
