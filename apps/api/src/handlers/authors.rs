use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use myblog_application::CreateAuthorInput;
use myblog_core::ContextSlot;
use myblog_domain::AuthorId;

use crate::dto::{AuthorResponse, CreateAuthorRequest, PublishEligibilityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_author_handler(
    State(state): State<AppState>,
    Extension(context): Extension<ContextSlot>,
    Json(payload): Json<CreateAuthorRequest>,
) -> ApiResult<(StatusCode, Json<AuthorResponse>)> {
    let author = state
        .blog_service
        .create_author(
            &context,
            CreateAuthorInput {
                name: payload.name,
                email: payload.email,
                bio: payload.bio.unwrap_or_default(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AuthorResponse::from(author))))
}

pub async fn can_publish_handler(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
) -> ApiResult<Json<PublishEligibilityResponse>> {
    let author_id = AuthorId::new(author_id)?;
    let eligibility = state.blog_service.can_publish(author_id).await?;

    Ok(Json(PublishEligibilityResponse::new(author_id, eligibility)))
}
