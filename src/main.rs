//! BANCA — betting ledger for home blackjack tables
//!
//! Entry point. Loads configuration, initialises structured logging and
//! serves the table API until Ctrl+C.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use banca::config::{self, AppConfig};
use banca::server::{self, TableState};

const BANNER: &str = r#"
 ____    _    _   _  ____    _
| __ )  / \  | \ | |/ ___|  / \
|  _ \ / _ \ |  \| | |     / _ \
| |_) / ___ \| |\  | |___ / ___ \
|____/_/   \_\_| \_|\____/_/   \_\

  banker-vs-players ledger
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let path =
        std::env::var("BANCA_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_FILE.to_string());
    let cfg = if Path::new(&path).exists() {
        AppConfig::load(&path)?
    } else {
        warn!(path = %path, "Config file not found, using defaults");
        AppConfig::default()
    };

    println!("{BANNER}");
    info!(
        table = %cfg.session.name,
        base_bet = %cfg.session.base_bet,
        currency = %cfg.display.currency_symbol,
        "BANCA starting up"
    );

    if !cfg.server.enabled {
        warn!("Table server disabled in config, nothing to do");
        return Ok(());
    }

    let state = Arc::new(TableState::from_config(&cfg));
    server::serve(state, &cfg.server.host, cfg.server.port, shutdown_signal()).await?;

    info!("BANCA shut down cleanly.");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("banca=info"));

    if std::env::var("BANCA_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
