use std::sync::Arc;

use myblog_application::{BlogListingCache, RateLimitRepository, RateLimitService};
use myblog_core::{AppError, AppResult};
use myblog_infrastructure::{
    InMemoryBlogListingCache, PostgresRateLimitRepository, RedisBlogListingCache,
    RedisRateLimitRepository,
};
use sqlx::PgPool;

use crate::api_config::{ApiConfig, BlogCacheBackend, RateLimitStoreConfig};

pub(super) fn build_blog_listing_cache(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<Arc<dyn BlogListingCache>> {
    match config.blog_cache_backend {
        BlogCacheBackend::InMemory => Ok(Arc::new(InMemoryBlogListingCache::new())),
        BlogCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when BLOG_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            Ok(Arc::new(RedisBlogListingCache::new(
                redis_client,
                "myblog:blogs_by_author",
            )))
        }
    }
}

pub(super) fn build_rate_limit_service(
    pool: &PgPool,
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<RateLimitService> {
    let rate_limit_repository: Arc<dyn RateLimitRepository> = match config.rate_limit_store {
        RateLimitStoreConfig::Postgres => Arc::new(PostgresRateLimitRepository::new(pool.clone())),
        RateLimitStoreConfig::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation("REDIS_URL is required when RATE_LIMIT_STORE=redis".to_owned())
            })?;
            Arc::new(RedisRateLimitRepository::new(redis_client, "myblog:throttle"))
        }
    };

    Ok(RateLimitService::new(rate_limit_repository))
}
