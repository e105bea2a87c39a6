//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_service;
mod blog_ports;
mod blog_service;
mod clock;
mod event_log_service;
mod publish_gate_service;
mod rate_limit_service;

pub use auth_service::{
    ApiTokenRepository, AuthService, IssuedToken, PasswordHasher, UserRecord, UserRepository,
};
pub use blog_ports::{
    AuthorRepository, BlogListingCache, BlogPage, BlogRepository, NewAuthor, NewBlog,
    PublishActivityRepository, PublishNotification, PublishNotifier,
};
pub use blog_service::{
    BlogService, CreateAuthorInput, DEFAULT_LISTING_CACHE_TTL_SECONDS, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE, PublishBlogInput,
};
pub use clock::{Clock, SystemClock};
pub use event_log_service::{EventLogger, LogLevel, LogSink, render_event};
pub use publish_gate_service::{PublishEligibility, PublishGateService};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
