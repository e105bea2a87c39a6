//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_publish_notifier;
mod in_memory_blog_listing_cache;
mod in_memory_blog_repository;
mod in_memory_rate_limit_repository;
mod in_memory_user_repository;
mod postgres_blog_repository;
mod postgres_rate_limit_repository;
mod postgres_user_repository;
mod redis_blog_listing_cache;
mod redis_rate_limit_repository;
mod tracing_log_sink;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_publish_notifier::ConsolePublishNotifier;
pub use in_memory_blog_listing_cache::InMemoryBlogListingCache;
pub use in_memory_blog_repository::InMemoryBlogRepository;
pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use postgres_blog_repository::PostgresBlogRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use redis_blog_listing_cache::RedisBlogListingCache;
pub use redis_rate_limit_repository::RedisRateLimitRepository;
pub use tracing_log_sink::TracingLogSink;
