use myblog_domain::Blog;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for publishing a blog.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/publish-blog-request.ts"
)]
pub struct PublishBlogRequest {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    #[ts(optional)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// API representation of a blog.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/blog-response.ts"
)]
pub struct BlogResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    /// RFC 3339 timestamp in UTC.
    pub created_at: String,
    /// RFC 3339 timestamp in UTC.
    pub updated_at: String,
}

impl From<Blog> for BlogResponse {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id.as_i64(),
            title: blog.title.as_str().to_owned(),
            content: blog.content,
            author_id: blog.author_id.as_i64(),
            cover_image: blog
                .cover_image
                .map(|cover_image| cover_image.image_link().to_owned()),
            tags: blog
                .tags
                .into_iter()
                .map(|tag| tag.as_str().to_owned())
                .collect(),
            created_at: blog.created_at.to_rfc3339(),
            updated_at: blog.updated_at.to_rfc3339(),
        }
    }
}

/// Query string of the paginated blog listing.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Query string of the per-author blog listing.
#[derive(Debug, Deserialize)]
pub struct AuthorBlogsQuery {
    pub author_id: i64,
}

/// Total number of blogs.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/total-blogs-response.ts"
)]
pub struct TotalBlogsResponse {
    pub total: i64,
}

/// Envelope shared by every blog listing.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/blog-list-response.ts"
)]
pub struct BlogListResponse {
    pub blogs: Vec<BlogResponse>,
}

impl From<Vec<Blog>> for BlogListResponse {
    fn from(blogs: Vec<Blog>) -> Self {
        Self {
            blogs: blogs.into_iter().map(BlogResponse::from).collect(),
        }
    }
}
