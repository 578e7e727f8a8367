//! HTTP API server for school-assist.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]

pub mod api_error;
mod caller;
mod handlers;
mod query_types;
mod response_types;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use school_assist_service::ChatService;
use tower_http::cors::CorsLayer;

pub use caller::{Caller, USER_ID_HEADER};
pub use response_types::{HistoryResponse, VersionResponse};

/// Spawns a background task that purges expired pending intents.
///
/// Reads already treat expired intents as absent; this keeps the table from
/// accumulating abandoned conversations. Errors are logged and retried on the
/// next tick.
pub fn start_pending_sweeper(chat_service: Arc<ChatService>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = chat_service.purge_expired_pending(chrono::Utc::now()).await {
                tracing::warn!(error = %e, "pending intent sweep failed");
            }
        }
    });
}

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub chat_service: Arc<ChatService>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/v1/ai/chat", post(handlers::chat::chat))
        .route("/api/v1/ai/chat/history", get(handlers::chat::history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
