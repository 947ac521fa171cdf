//! Router assembly and serving

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use eyre::{Context, Result};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::handlers::{self, AppState};
use crate::config::ServerConfig;
use crate::conversation::ConversationEngine;

/// Build the HTTP router, nested under the configured base path
pub fn router(engine: Arc<ConversationEngine>, config: &ServerConfig) -> Router {
    debug!(base_path = %config.base_path, "router: called");
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/start", get(handlers::start).post(handlers::start))
        .route("/process", post(handlers::process))
        .route("/field-components/:name", get(handlers::field_components))
        .route("/components", get(handlers::components))
        .route("/diagram/:session_id", get(handlers::diagram))
        .with_state(AppState { engine });

    let base = config.base_path.trim_matches('/');
    let app = if base.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{}", base), api)
    };

    let app = app.layer(TraceLayer::new_for_http());
    if config.cors_allow_any {
        app.layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
    } else {
        app
    }
}

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(engine: Arc<ConversationEngine>, config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_addr();
    debug!(%addr, "serve: called");
    let app = router(engine, config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, base_path = %config.base_path, "Journey builder listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
