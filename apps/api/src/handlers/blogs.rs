use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use myblog_application::PublishBlogInput;
use myblog_core::ContextSlot;
use myblog_domain::AuthorId;

use crate::dto::{
    AuthorBlogsQuery, BlogListResponse, BlogResponse, PaginationQuery, PublishBlogRequest,
    TotalBlogsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_blogs_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<BlogListResponse>> {
    let blogs = state.blog_service.all_blogs().await?;
    Ok(Json(BlogListResponse::from(blogs)))
}

pub async fn paginated_blogs_handler(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    let blogs = state
        .blog_service
        .blogs_page(query.page.unwrap_or(1), query.page_size)
        .await?;
    Ok(Json(BlogListResponse::from(blogs)))
}

pub async fn author_blogs_handler(
    State(state): State<AppState>,
    Extension(context): Extension<ContextSlot>,
    Query(query): Query<AuthorBlogsQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    let author_id = AuthorId::new(query.author_id)?;
    let blogs = state.blog_service.author_blogs(&context, author_id).await?;
    Ok(Json(BlogListResponse::from(blogs)))
}

pub async fn total_blogs_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<TotalBlogsResponse>> {
    let total = state.blog_service.total_blogs().await?;
    Ok(Json(TotalBlogsResponse { total }))
}

pub async fn publish_blog_handler(
    State(state): State<AppState>,
    Extension(context): Extension<ContextSlot>,
    Json(payload): Json<PublishBlogRequest>,
) -> ApiResult<(StatusCode, Json<BlogResponse>)> {
    let blog = state
        .blog_service
        .publish_blog(
            &context,
            PublishBlogInput {
                author_id: payload.author_id,
                title: payload.title,
                content: payload.content,
                cover_image: payload.cover_image,
                tags: payload.tags,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(BlogResponse::from(blog))))
}
