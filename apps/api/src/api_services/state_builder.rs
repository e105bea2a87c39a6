use std::sync::Arc;

use myblog_application::{AuthService, BlogService, EventLogger, PublishGateService, SystemClock};
use myblog_core::AppError;
use myblog_infrastructure::{
    Argon2PasswordHasher, ConsolePublishNotifier, PostgresBlogRepository, PostgresUserRepository,
    TracingLogSink,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::redis::build_redis_client;

mod caches;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let blog_repository = Arc::new(PostgresBlogRepository::new(pool.clone()));
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let clock = Arc::new(SystemClock);

    let blog_listing_cache = caches::build_blog_listing_cache(config, redis_client.clone())?;
    let rate_limit_service = caches::build_rate_limit_service(&pool, config, redis_client.clone())?;

    let blog_service = BlogService::new(
        blog_repository.clone(),
        blog_repository.clone(),
        PublishGateService::new(blog_repository, clock.clone()),
        Arc::new(ConsolePublishNotifier::new()),
        EventLogger::new(Arc::new(TracingLogSink::new()), config.log_channel.clone()),
        clock,
    )
    .with_listing_cache(blog_listing_cache, config.blog_cache_ttl_seconds);

    let auth_service = AuthService::new(
        user_repository.clone(),
        user_repository,
        Arc::new(Argon2PasswordHasher::new()),
    );

    Ok(AppState {
        blog_service,
        auth_service,
        rate_limit_service,
        throttle: config.throttle.clone(),
        postgres_pool: Some(pool),
        redis_client,
        redis_required: config.requires_redis(),
    })
}
