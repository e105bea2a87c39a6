use axum::Json;
use axum::extract::State;
use myblog_core::AppError;

use crate::dto::{LoginRequest, LoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let issued = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid username or password".to_owned()))?;

    tracing::info!(user_id = issued.identity.user_id(), "api token issued");

    Ok(Json(LoginResponse {
        token: issued.token,
    }))
}
