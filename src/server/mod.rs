//! Table server — Axum JSON API over the in-memory session.
//!
//! The front end drives the table through these endpoints. CORS is open for
//! local development; state lives only as long as the process.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use routes::{AppState, TableState};

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/session", get(routes::get_session))
        .route("/api/participants", post(routes::add_participant))
        .route("/api/participants/:id", delete(routes::remove_participant))
        .route("/api/banker", put(routes::set_banker))
        .route("/api/base-bet", put(routes::set_base_bet))
        .route("/api/wagers/:id", put(routes::set_wager))
        .route("/api/outcomes/:id", post(routes::toggle_outcome))
        .route("/api/rounds", post(routes::confirm_round))
        .route("/api/undo", post(routes::undo))
        .route("/api/ledger", get(routes::get_ledger))
        .route("/api/history", get(routes::get_history))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(state: AppState, host: &str, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind table server to {addr}"))?;
    info!(%addr, "Table server listening on http://{addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Table server error")?;

    info!("Table server stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
