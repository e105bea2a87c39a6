//! Persistence, cache and notification ports for blogs and authors.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use myblog_core::{AppResult, NonEmptyString};
use myblog_domain::{Author, AuthorId, Blog, BlogId, BlogTitle, CoverImage, EmailAddress, Tag};

/// Validated author data ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    /// Display name.
    pub name: NonEmptyString,
    /// Unique email address.
    pub email: EmailAddress,
    /// Free-form biography.
    pub bio: String,
}

/// Validated blog data ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlog {
    /// Unique title.
    pub title: BlogTitle,
    /// Body text.
    pub content: String,
    /// Owning author.
    pub author_id: AuthorId,
    /// Optional cover image.
    pub cover_image: Option<CoverImage>,
    /// Normalized tags.
    pub tags: Vec<Tag>,
    /// Publish timestamp taken from the service clock.
    pub created_at: DateTime<Utc>,
}

/// Offset window over the blog listing, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogPage {
    /// Rows to skip.
    pub offset: i64,
    /// Maximum rows to return.
    pub limit: i64,
}

/// Repository port for authors.
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Persists a new author. Fails with `Conflict` when the email is taken.
    async fn create_author(&self, author: NewAuthor) -> AppResult<Author>;

    /// Loads one author.
    async fn find_author(&self, author_id: AuthorId) -> AppResult<Option<Author>>;
}

/// Repository port for blogs.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Persists a new blog. Fails with `Conflict` when the title is taken.
    async fn create_blog(&self, blog: NewBlog) -> AppResult<Blog>;

    /// Lists every blog of one author, newest first.
    async fn list_blogs_by_author(&self, author_id: AuthorId) -> AppResult<Vec<Blog>>;

    /// Lists blogs newest first, optionally windowed.
    async fn list_blogs(&self, page: Option<BlogPage>) -> AppResult<Vec<Blog>>;

    /// Counts all blogs.
    async fn count_blogs(&self) -> AppResult<i64>;
}

/// Read-only count query consulted by the publish gate.
#[async_trait]
pub trait PublishActivityRepository: Send + Sync {
    /// Counts blogs of `author_id` whose UTC creation date equals `date`.
    async fn count_published_on(&self, author_id: AuthorId, date: NaiveDate) -> AppResult<i64>;
}

/// Optional cache port for per-author blog listings.
#[async_trait]
pub trait BlogListingCache: Send + Sync {
    /// Returns the cached listing for one author.
    async fn get_author_blogs(&self, author_id: AuthorId) -> AppResult<Option<Vec<Blog>>>;

    /// Stores the listing for one author with ttl.
    async fn set_author_blogs(
        &self,
        author_id: AuthorId,
        blogs: &[Blog],
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops the cached listing for one author.
    async fn invalidate_author(&self, author_id: AuthorId) -> AppResult<()>;
}

/// Facts about a freshly published blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishNotification {
    /// Published blog.
    pub blog_id: BlogId,
    /// Author of the blog.
    pub author_id: AuthorId,
    /// Blog title.
    pub title: String,
}

/// Port for post-publish side effects.
#[async_trait]
pub trait PublishNotifier: Send + Sync {
    /// Tells the author their blog went live.
    async fn notify_author(&self, notification: &PublishNotification) -> AppResult<()>;

    /// Tells the author's followers about the new blog.
    async fn notify_followers(&self, notification: &PublishNotification) -> AppResult<()>;
}
