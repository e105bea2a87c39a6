use myblog_application::{AuthService, BlogService, RateLimitService};
use sqlx::PgPool;

use crate::api_config::ThrottleRates;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog_service: BlogService,
    pub auth_service: AuthService,
    pub rate_limit_service: RateLimitService,
    pub throttle: ThrottleRates,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
    pub redis_required: bool,
}
