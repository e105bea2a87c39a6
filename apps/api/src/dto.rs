mod auth;
mod authors;
mod blogs;
mod common;

pub use auth::{LoginRequest, LoginResponse};
pub use authors::{AuthorResponse, CreateAuthorRequest, PublishEligibilityResponse};
pub use blogs::{
    AuthorBlogsQuery, BlogListResponse, BlogResponse, PaginationQuery, PublishBlogRequest,
    TotalBlogsResponse,
};
pub use common::{HealthDependencyStatus, HealthResponse, MessageResponse, StatusResponse};
