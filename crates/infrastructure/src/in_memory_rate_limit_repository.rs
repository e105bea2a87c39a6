use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use myblog_application::{AttemptInfo, RateLimitRepository};
use myblog_core::{AppError, AppResult};
use tokio::sync::Mutex;

/// Process-local throttle counters for tests and single-node development.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    windows: Mutex<HashMap<String, AttemptInfo>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        if window_duration_seconds <= 0 {
            return Err(AppError::Validation(
                "window_duration_seconds must be greater than zero".to_owned(),
            ));
        }

        let now = Utc::now();
        let window = Duration::seconds(window_duration_seconds);
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.to_owned()).or_insert(AttemptInfo {
            attempt_count: 0,
            window_started_at: now,
        });

        if entry.window_started_at + window < now {
            entry.attempt_count = 0;
            entry.window_started_at = now;
        }
        entry.attempt_count = entry.attempt_count.saturating_add(1);

        Ok(entry.clone())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut windows = self.windows.lock().await;
        let initial = windows.len();
        windows.retain(|_, info| info.window_started_at >= before);
        Ok((initial - windows.len()) as u64)
    }
}
