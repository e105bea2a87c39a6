use std::sync::Arc;

use chrono::Utc;

use myblog_core::{AppError, AppResult};

use super::config::RateLimitRule;
use super::ports::RateLimitRepository;

/// Application service for request throttling.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Checks whether the given key is within the rate limit.
    ///
    /// Records the attempt and returns `Ok(())` if allowed, or
    /// `Err(AppError::RateLimited)` if the limit has been exceeded.
    ///
    /// `key` identifies the caller inside the rule's scope, typically a user
    /// id or a client IP address.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            tracing::debug!(
                scope = %rule.category,
                attempts = info.attempt_count,
                window_started_at = %info.window_started_at,
                "request throttled"
            );
            return Err(AppError::RateLimited(
                "request was throttled, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes expired rate limit entries. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}
