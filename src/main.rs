//! X Auto-Poster: binary entrypoint.
//! Loads configuration, wires the pipeline, and runs the posting loop.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use x_auto_poster::bot::AutoPosterBot;
use x_auto_poster::config::{self, AppConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("x_auto_poster=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let path = config::config_path();
    let mut cfg = AppConfig::load_or_create(&path)?;
    cfg.apply_env_overrides();

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            tracing::error!("config error: {e}");
        }
        anyhow::bail!(
            "configuration invalid ({} problems); run the setup binary or edit {}",
            errors.len(),
            path.display()
        );
    }

    AutoPosterBot::from_config(cfg)?.run().await
}
