//! Per-author daily publish admission check.
//!
//! The gate only reads: it counts the blogs an author created on the current
//! UTC day and compares the count with the daily quota. Recording the new blog
//! is the caller's job once the gate has approved.

use std::sync::Arc;

use myblog_core::AppResult;
use myblog_domain::{Author, AuthorId, PublishQuota};

use crate::blog_ports::PublishActivityRepository;
use crate::clock::Clock;

/// Outcome of a publish admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishEligibility {
    /// Whether one more blog may be published today.
    pub allowed: bool,
    /// Blogs already published today.
    pub published_today: i64,
    /// Daily quota in effect.
    pub daily_limit: i64,
}

impl PublishEligibility {
    /// Returns how many more blogs may be published today.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        (self.daily_limit - self.published_today).max(0)
    }
}

/// Application service deciding whether an author may publish today.
#[derive(Clone)]
pub struct PublishGateService {
    repository: Arc<dyn PublishActivityRepository>,
    clock: Arc<dyn Clock>,
    quota: PublishQuota,
}

impl PublishGateService {
    /// Creates a gate with the default daily quota.
    #[must_use]
    pub fn new(repository: Arc<dyn PublishActivityRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            quota: PublishQuota::default(),
        }
    }

    /// Returns whether `author` may publish one more blog today.
    pub async fn can_publish(&self, author: &Author) -> AppResult<bool> {
        Ok(self.eligibility(author).await?.allowed)
    }

    /// Returns the full admission decision for `author`.
    pub async fn eligibility(&self, author: &Author) -> AppResult<PublishEligibility> {
        let published_today = self.published_today(author.id()).await?;

        Ok(PublishEligibility {
            allowed: self.quota.allows(published_today),
            published_today,
            daily_limit: self.quota.daily_limit(),
        })
    }

    async fn published_today(&self, author_id: AuthorId) -> AppResult<i64> {
        let today = self.clock.today();
        self.repository.count_published_on(author_id, today).await
    }
}
