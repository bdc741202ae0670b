//! # llm-bench
//!
//! Interactive tokens/second benchmark for local LLM servers.

use llm_speedbench::{
    cli::Cli, setup_shutdown_handler, ui::App, ConfigStore, PromptCatalog, ResultsLog,
};
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let store = ConfigStore::new(cli.config_path());
    let config = store.load();
    info!("Settings: {}", store.path().display());
    info!("Prompts: {}", cli.prompts_dir.display());

    let shutdown = setup_shutdown_handler();
    let mut app = App::new(
        store,
        config,
        PromptCatalog::new(&cli.prompts_dir),
        ResultsLog::new(cli.results_path()),
        cli.sessions_root(),
        shutdown,
    );

    let result = app.run().await;
    app.save_config();

    match result {
        Ok(()) => {}
        Err(e) if e.is_interrupt() => info!("Interrupted, settings saved"),
        Err(e) => eprintln!("❌ {}", e),
    }
    println!("\n👋 Goodbye!");
}
