use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use school_assist_service::ChatReply;

use crate::AppState;
use crate::api_error::ApiError;
use crate::caller::Caller;
use crate::query_types::{ChatRequest, HistoryQuery};
use crate::response_types::HistoryResponse;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let reply = state.chat_service.handle(&user, &request.message).await?;
    tracing::debug!(
        user_id = %user.id,
        intent = reply.intent.map_or("none", |i| i.as_str()),
        "chat handled"
    );
    Ok(Json(reply))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let data = state.chat_service.history(&user, query.limit(), query.scope()).await?;
    Ok(Json(HistoryResponse { data }))
}
