//! Heartwise: Heart disease risk assessment
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartwise::adapters::JsonModelClassifier;
use heartwise::config::Config;
use heartwise::tui::App;
use heartwise::{HeartwiseError, RiskEvaluator};

fn main() -> Result<()> {
    let config = Config::from_env().map_err(HeartwiseError::from)?;

    // Writing logs to the terminal corrupts the TUI (alternate screen):
    // interactive sessions log to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting Heartwise...");

    // Refuse to start without a usable model; the terminal is still in normal mode here.
    let model = JsonModelClassifier::load(&config.model_path, config.require_manifest)
        .map_err(HeartwiseError::StartupFailure)
        .with_context(|| format!("Failed to load model from {:?}", config.model_path))?;

    let mut app = App::new(RiskEvaluator::new(Arc::new(model)));
    app.run()?;

    tracing::info!("Heartwise shutdown complete.");
    Ok(())
}
