use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use school_assist_core::PENDING_SWEEP_INTERVAL_SECS;
use school_assist_core::env_config::env_parse_with_default;
use school_assist_http::{AppState, create_router, start_pending_sweeper};
use school_assist_service::{AssistantSettings, ChatService};

use crate::open_storage;

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let storage = Arc::new(open_storage().await?);
    tracing::info!(backend = storage.kind(), "Storage ready");

    let settings = AssistantSettings::from_env();
    let chat_service = Arc::new(ChatService::new(storage, settings)?);
    if chat_service.assistant_enabled() {
        tracing::info!("AI assistant enabled");
    } else {
        tracing::info!("AI assistant disabled, using route guide replies");
    }

    let sweep_secs = env_parse_with_default("PENDING_SWEEP_INTERVAL_SECS", PENDING_SWEEP_INTERVAL_SECS);
    start_pending_sweeper(Arc::clone(&chat_service), Duration::from_secs(sweep_secs.max(1)));

    let state = Arc::new(AppState { chat_service });
    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
