//! Caller identification.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user id in the `x-user-id` header.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use school_assist_core::ChatUser;

use crate::AppState;
use crate::api_error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The resolved user behind a request.
#[derive(Debug, Clone)]
pub struct Caller(pub ChatUser);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
        let user = state.chat_service.resolve_user(user_id).await?;
        Ok(Self(user))
    }
}
