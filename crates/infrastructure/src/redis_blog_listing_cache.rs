//! Redis-backed per-author blog listing cache. Entries are JSON arrays.

use async_trait::async_trait;
use myblog_application::BlogListingCache;
use myblog_core::{AppError, AppResult};
use myblog_domain::{AuthorId, Blog};
use redis::AsyncCommands;

/// Redis implementation of the blog listing cache port.
#[derive(Clone)]
pub struct RedisBlogListingCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisBlogListingCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, author_id: AuthorId) -> String {
        format!("{}:author={author_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl BlogListingCache for RedisBlogListingCache {
    async fn get_author_blogs(&self, author_id: AuthorId) -> AppResult<Option<Vec<Blog>>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> = connection
            .get(self.key_for(author_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to read blog listing of author '{author_id}': {error}"
                ))
            })?;

        encoded
            .map(|value| {
                serde_json::from_str::<Vec<Blog>>(&value).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid cached blog listing for author '{author_id}': {error}"
                    ))
                })
            })
            .transpose()
    }

    async fn set_author_blogs(
        &self,
        author_id: AuthorId,
        blogs: &[Blog],
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let value = serde_json::to_string(blogs).map_err(|error| {
            AppError::Internal(format!("failed to encode blog listing: {error}"))
        })?;
        let mut connection = self.connection().await?;

        connection
            .set_ex(self.key_for(author_id), value, u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write blog listing of author '{author_id}': {error}"
                ))
            })
    }

    async fn invalidate_author(&self, author_id: AuthorId) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let _: u64 = connection.del(self.key_for(author_id)).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to drop blog listing of author '{author_id}': {error}"
            ))
        })?;
        Ok(())
    }
}
