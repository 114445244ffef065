//! Chat backend: router and server loop.

pub mod handlers;
pub mod page;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::protocol::{HISTORY_PATH, SEND_MESSAGE_PATH};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/", get(handlers::index_handler))
        .route(SEND_MESSAGE_PATH, post(handlers::send_message))
        .route(HISTORY_PATH, get(handlers::get_history))
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    let state = AppState::new(config);

    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    serve(listener, state).await
}

/// Serve the router on an already bound listener until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
