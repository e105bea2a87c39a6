//! Blog, tag and cover image domain types.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};
use myblog_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::author::AuthorId;

/// Maximum number of characters in a blog title.
pub const BLOG_TITLE_MAX_LENGTH: usize = 100;

/// Maximum number of characters in a tag name.
pub const TAG_NAME_MAX_LENGTH: usize = 100;

/// Persisted identifier of a blog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlogId(i64);

impl BlogId {
    /// Creates a blog identifier from a database key.
    pub fn new(value: i64) -> AppResult<Self> {
        if value <= 0 {
            return Err(AppError::Validation(format!(
                "blog id must be positive, got {value}"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying database key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for BlogId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, globally unique blog title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlogTitle(String);

impl BlogTitle {
    /// Creates a trimmed, length-checked title.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation("blog title must not be empty".to_owned()));
        }

        if trimmed.chars().count() > BLOG_TITLE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "blog title must not exceed {BLOG_TITLE_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Creates a lower-cased, length-checked tag.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation("tag name must not be empty".to_owned()));
        }

        if normalized.chars().count() > TAG_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "tag name must not exceed {TAG_NAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the tag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Link to the image shown above a blog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverImage(String);

impl CoverImage {
    /// Creates a cover image from an absolute http(s) URL.
    pub fn new(image_link: impl Into<String>) -> AppResult<Self> {
        let image_link = image_link.into();
        let trimmed = image_link.trim();

        let host = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| {
                AppError::Validation("cover image link must be an http(s) URL".to_owned())
            })?;

        if host.is_empty() || host.starts_with('/') || trimmed.contains(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "cover image link '{trimmed}' is not a valid URL"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the image URL.
    #[must_use]
    pub fn image_link(&self) -> &str {
        self.0.as_str()
    }
}

/// A blog post written by an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Blog identifier.
    pub id: BlogId,
    /// Unique title.
    pub title: BlogTitle,
    /// Body text.
    pub content: String,
    /// Owning author.
    pub author_id: AuthorId,
    /// Optional cover image.
    pub cover_image: Option<CoverImage>,
    /// Tags attached to the blog.
    pub tags: Vec<Tag>,
    /// Creation timestamp, which doubles as the publish time.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Returns the UTC calendar date the blog was published on.
    #[must_use]
    pub fn published_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// Normalizes a tag list: validates each name, drops duplicates, sorts.
pub fn normalize_tags<I, S>(names: I) -> AppResult<Vec<Tag>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tags = names
        .into_iter()
        .map(Tag::new)
        .collect::<AppResult<Vec<_>>>()?;
    tags.sort();
    tags.dedup();
    Ok(tags)
}
