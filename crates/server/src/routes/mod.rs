//! HTTP route handlers for the API server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Accounts
//! POST /register               - Create an account
//! POST /login                  - Check credentials
//!
//! # MediBot
//! POST /chat                   - Send a message, get the reply and recent history
//! POST /chat/history           - Stored transcript ({ email } body)
//! GET  /chat/history?email=    - Stored transcript (query string)
//! ```

pub mod auth;
pub mod chat;
pub mod health;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the chat routes router.
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(chat::send))
        .route("/history", get(chat::history_query).post(chat::history))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .nest("/chat", chat_routes())
}

/// The complete application: API routes, health checks, tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for the browser storefront. With no origin configured any origin is
/// allowed; an unparseable origin allows none.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    match origin {
        None => base.allow_origin(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => base.allow_origin(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "ignoring invalid CORS origin");
                base
            }
        },
    }
}
