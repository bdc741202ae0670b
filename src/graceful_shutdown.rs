//! # Graceful Shutdown Module
//!
//! Turns Ctrl-C (and SIGTERM on unix) into a cooperative cancellation the
//! benchmark loop can observe. While a menu is on screen the terminal is in
//! raw mode and Ctrl-C arrives as a key press instead; the menu code maps that
//! to [`BenchError::Interrupted`](crate::error::BenchError::Interrupted).
//!
//! ## Shutdown Process:
//!
//! 1. **Signal Reception**: the watcher task receives SIGINT or SIGTERM
//! 2. **Cancellation**: the in-flight backend request is dropped
//! 3. **Unwind**: the batch and the menu loop return
//! 4. **Flush**: settings are saved and the process exits normally

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// # Graceful Shutdown Manager
///
/// Cheap to clone; every clone observes the same shutdown.
#[derive(Clone, Debug, Default)]
pub struct GracefulShutdown {
    token: CancellationToken,
}

impl GracefulShutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a shutdown signal has been received
    pub fn is_shutdown_initiated(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn initiate_shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("🛑 Shutdown requested");
        }
        self.token.cancel();
    }

    /// Resolves once shutdown has been initiated
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// # Wait for shutdown signal
    ///
    /// Waits for SIGINT (Ctrl-C) or SIGTERM and initiates shutdown.
    pub async fn wait_for_shutdown_signal(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            tokio::select! {
                result = signal::ctrl_c() => {
                    result?;
                    info!("📡 Received SIGINT (Ctrl+C)");
                }
                _ = sigterm.recv() => {
                    info!("📡 Received SIGTERM");
                }
            }
        }
        #[cfg(not(unix))]
        {
            signal::ctrl_c().await?;
            info!("📡 Received Ctrl+C");
        }

        self.initiate_shutdown();
        Ok(())
    }
}

/// # Shutdown Signal Handler
///
/// Spawns the signal watcher and returns the manager it cancels. Must be called
/// from within a tokio runtime.
pub fn setup_shutdown_handler() -> GracefulShutdown {
    let shutdown = GracefulShutdown::new();

    let watcher = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = watcher.wait_for_shutdown_signal().await {
            error!("❌ Error waiting for shutdown signal: {}", e);
        }
    });

    shutdown
}
