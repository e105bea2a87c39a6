//! Development publish notifier. Writes notifications to tracing output.

use async_trait::async_trait;
use myblog_application::{PublishNotification, PublishNotifier};
use myblog_core::AppResult;
use tracing::info;

/// Publish notifier that logs instead of delivering mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePublishNotifier;

impl ConsolePublishNotifier {
    /// Creates a new console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PublishNotifier for ConsolePublishNotifier {
    async fn notify_author(&self, notification: &PublishNotification) -> AppResult<()> {
        info!(
            blog_id = notification.blog_id.as_i64(),
            author_id = notification.author_id.as_i64(),
            "--- NOTIFY AUTHOR (console) ---\nYour blog '{}' is live.",
            notification.title
        );

        Ok(())
    }

    async fn notify_followers(&self, notification: &PublishNotification) -> AppResult<()> {
        info!(
            blog_id = notification.blog_id.as_i64(),
            author_id = notification.author_id.as_i64(),
            "--- NOTIFY FOLLOWERS (console) ---\nNew blog from author {}: '{}'",
            notification.author_id,
            notification.title
        );

        Ok(())
    }
}
