use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use myblog_application::BlogListingCache;
use myblog_core::AppResult;
use myblog_domain::{AuthorId, Blog};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct ListingCacheEntry {
    blogs: Vec<Blog>,
    expires_at: Instant,
}

/// In-memory cache adapter for per-author blog listings.
#[derive(Debug, Default)]
pub struct InMemoryBlogListingCache {
    entries: RwLock<HashMap<AuthorId, ListingCacheEntry>>,
}

impl InMemoryBlogListingCache {
    /// Creates an empty in-memory listing cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogListingCache for InMemoryBlogListingCache {
    async fn get_author_blogs(&self, author_id: AuthorId) -> AppResult<Option<Vec<Blog>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(&author_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.blogs.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&author_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&author_id);
        }

        Ok(None)
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

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries.write().await.insert(
            author_id,
            ListingCacheEntry {
                blogs: blogs.to_vec(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate_author(&self, author_id: AuthorId) -> AppResult<()> {
        self.entries.write().await.remove(&author_id);
        Ok(())
    }
}
