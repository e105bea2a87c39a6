use std::time::Duration;

use myblog_application::RateLimitService;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Periodically drops throttle windows older than a day.
pub fn spawn_rate_limit_cleanup(service: RateLimitService, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_seconds = period.as_secs(), "rate limit cleanup started");

        loop {
            tokio::time::sleep(period).await;

            match service.cleanup().await {
                Ok(removed) => debug!(removed, "expired rate limit windows removed"),
                Err(error) => error!(error = %error, "rate limit cleanup failed"),
            }
        }
    })
}
