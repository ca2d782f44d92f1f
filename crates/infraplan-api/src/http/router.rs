//! Axum router configuration with middleware.
//!
//! Middleware: CORS (any origin), request tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/start", post(handlers::conversation::start))
        .route("/chat/{session_id}", post(handlers::conversation::chat))
        .route(
            "/create_boq/{session_id}",
            post(handlers::conversation::create_boq),
        )
        .route(
            "/session/{session_id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus the number of live sessions.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "active_sessions": state.conversation_service.active_sessions().await,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
