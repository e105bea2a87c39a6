use myblog_core::{AppError, AppResult};

/// Configuration for a rate limit rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    /// The throttle scope name (e.g., "anon", "blog_limit").
    pub category: String,
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }

    /// Parses a rate written as `"<count>/<period>"`.
    ///
    /// The period is matched on its first letter, so `s`, `sec`, `min`,
    /// `minute`, `hour` and `day` are all accepted.
    pub fn parse(category: impl Into<String>, rate: &str) -> AppResult<Self> {
        let category = category.into();
        let (count, period) = rate.trim().split_once('/').ok_or_else(|| {
            AppError::Validation(format!(
                "rate '{rate}' for '{category}' must look like '<count>/<period>'"
            ))
        })?;

        let max_attempts = count.trim().parse::<i32>().map_err(|error| {
            AppError::Validation(format!("invalid request count in rate '{rate}': {error}"))
        })?;
        if max_attempts <= 0 {
            return Err(AppError::Validation(format!(
                "request count in rate '{rate}' must be greater than zero"
            )));
        }

        let window_seconds = match period.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 60 * 60,
            Some('d') => 24 * 60 * 60,
            _ => {
                return Err(AppError::Validation(format!(
                    "unknown period in rate '{rate}', expected second, minute, hour or day"
                )));
            }
        };

        Ok(Self {
            category,
            max_attempts,
            window_seconds,
        })
    }
}
