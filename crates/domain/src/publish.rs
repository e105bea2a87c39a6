//! Daily publish quota rules.

use myblog_core::{AppError, AppResult};

/// Number of blogs one author may publish per UTC calendar day.
pub const DAILY_PUBLISH_QUOTA: i64 = 10;

/// Per-author daily publish limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishQuota {
    daily_limit: i64,
}

impl PublishQuota {
    /// Creates a quota with a custom daily limit.
    pub fn daily(daily_limit: i64) -> AppResult<Self> {
        if daily_limit < 0 {
            return Err(AppError::Validation(format!(
                "daily publish limit must not be negative, got {daily_limit}"
            )));
        }

        Ok(Self { daily_limit })
    }

    /// Returns the daily limit.
    #[must_use]
    pub fn daily_limit(&self) -> i64 {
        self.daily_limit
    }

    /// Returns whether one more publish is allowed after `published_today`.
    #[must_use]
    pub fn allows(&self, published_today: i64) -> bool {
        published_today < self.daily_limit
    }
}

impl Default for PublishQuota {
    fn default() -> Self {
        Self {
            daily_limit: DAILY_PUBLISH_QUOTA,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn default_quota_boundaries() {
        let quota = PublishQuota::default();
        assert!(quota.allows(0));
        assert!(quota.allows(9));
        assert!(!quota.allows(10));
        assert!(!quota.allows(11));
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(PublishQuota::daily(-1).is_err());
    }

    #[test]
    fn zero_limit_blocks_everything() -> AppResult<()> {
        assert!(!PublishQuota::daily(0)?.allows(0));
        Ok(())
    }

    proptest! {
        #[test]
        fn default_quota_allows_exactly_below_ten(published_today in 0_i64..1_000) {
            let quota = PublishQuota::default();
            prop_assert_eq!(quota.allows(published_today), published_today < DAILY_PUBLISH_QUOTA);
        }
    }
}
