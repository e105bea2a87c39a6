//! Blog and author application service.
//!
//! Publishing runs through the daily admission gate before anything is
//! written. Post-publish side effects (cache invalidation, notifications)
//! are best-effort and never undo a recorded blog.

use std::sync::Arc;

use myblog_core::{AppError, AppResult, ContextSlot};
use myblog_domain::{
    Author, AuthorId, Blog, BlogTitle, CoverImage, EmailAddress, normalize_tags,
    validate_author_name,
};
use serde_json::json;

use crate::blog_ports::{
    AuthorRepository, BlogListingCache, BlogPage, BlogRepository, NewAuthor, NewBlog,
    PublishNotification, PublishNotifier,
};
use crate::clock::Clock;
use crate::event_log_service::{EventLogger, LogLevel};
use crate::publish_gate_service::{PublishEligibility, PublishGateService};

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default lifetime of a cached author listing.
pub const DEFAULT_LISTING_CACHE_TTL_SECONDS: u32 = 600;

/// Raw input for creating an author.
#[derive(Debug, Clone)]
pub struct CreateAuthorInput {
    /// Display name.
    pub name: String,
    /// Contact email, unique per author.
    pub email: String,
    /// Optional biography.
    pub bio: String,
}

/// Raw input for publishing a blog.
#[derive(Debug, Clone)]
pub struct PublishBlogInput {
    /// Author the blog is published under.
    pub author_id: i64,
    /// Title, unique across all blogs.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Optional cover image link.
    pub cover_image: Option<String>,
    /// Tag names.
    pub tags: Vec<String>,
}

/// Application service for authors and blogs.
#[derive(Clone)]
pub struct BlogService {
    author_repository: Arc<dyn AuthorRepository>,
    blog_repository: Arc<dyn BlogRepository>,
    publish_gate: PublishGateService,
    notifier: Arc<dyn PublishNotifier>,
    event_logger: EventLogger,
    clock: Arc<dyn Clock>,
    listing_cache: Option<Arc<dyn BlogListingCache>>,
    listing_cache_ttl_seconds: u32,
}

impl BlogService {
    /// Creates a new blog service without listing cache.
    #[must_use]
    pub fn new(
        author_repository: Arc<dyn AuthorRepository>,
        blog_repository: Arc<dyn BlogRepository>,
        publish_gate: PublishGateService,
        notifier: Arc<dyn PublishNotifier>,
        event_logger: EventLogger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            author_repository,
            blog_repository,
            publish_gate,
            notifier,
            event_logger,
            clock,
            listing_cache: None,
            listing_cache_ttl_seconds: DEFAULT_LISTING_CACHE_TTL_SECONDS,
        }
    }

    /// Configures the per-author listing cache. A ttl of zero disables caching.
    #[must_use]
    pub fn with_listing_cache(
        mut self,
        listing_cache: Arc<dyn BlogListingCache>,
        ttl_seconds: u32,
    ) -> Self {
        self.listing_cache = Some(listing_cache);
        self.listing_cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Returns the admission gate used by this service.
    #[must_use]
    pub fn publish_gate(&self) -> &PublishGateService {
        &self.publish_gate
    }

    /// Creates a new author.
    pub async fn create_author(
        &self,
        context: &ContextSlot,
        input: CreateAuthorInput,
    ) -> AppResult<Author> {
        let name = validate_author_name(input.name)?;
        let email = EmailAddress::new(input.email)?;

        let author = self
            .author_repository
            .create_author(NewAuthor {
                name,
                email,
                bio: input.bio.trim().to_owned(),
            })
            .await?;

        self.event_logger.log_event(
            context,
            "author_created",
            &json!({
                "author_id": author.id().as_i64(),
                "name": author.name(),
            }),
        );

        Ok(author)
    }

    /// Loads one author or fails with `NotFound`.
    pub async fn find_author(&self, author_id: AuthorId) -> AppResult<Author> {
        self.author_repository
            .find_author(author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("author '{author_id}' does not exist")))
    }

    /// Returns the admission decision for one author.
    pub async fn can_publish(&self, author_id: AuthorId) -> AppResult<PublishEligibility> {
        let author = self.find_author(author_id).await?;
        self.publish_gate.eligibility(&author).await
    }

    /// Publishes a blog when the author is still within the daily quota.
    pub async fn publish_blog(
        &self,
        context: &ContextSlot,
        input: PublishBlogInput,
    ) -> AppResult<Blog> {
        let author_id = AuthorId::new(input.author_id)?;
        let title = BlogTitle::new(input.title)?;
        let cover_image = input
            .cover_image
            .filter(|link| !link.trim().is_empty())
            .map(CoverImage::new)
            .transpose()?;
        let tags = normalize_tags(input.tags)?;

        let author = self.find_author(author_id).await?;
        let eligibility = self.publish_gate.eligibility(&author).await?;
        if !eligibility.allowed {
            self.event_logger.log_event_at(
                context,
                "publish_rejected",
                &json!({
                    "author_id": author_id.as_i64(),
                    "published_today": eligibility.published_today,
                    "daily_limit": eligibility.daily_limit,
                }),
                LogLevel::Warn,
            );
            return Err(AppError::RateLimited(format!(
                "author '{author_id}' reached the daily limit of {} blogs",
                eligibility.daily_limit
            )));
        }

        let blog = self
            .blog_repository
            .create_blog(NewBlog {
                title,
                content: input.content,
                author_id,
                cover_image,
                tags,
                created_at: self.clock.now(),
            })
            .await?;

        if let Some(cache) = &self.listing_cache
            && let Err(error) = cache.invalidate_author(author_id).await
        {
            tracing::warn!(
                %error,
                author_id = author_id.as_i64(),
                "failed to invalidate blog listing cache"
            );
        }

        let notification = PublishNotification {
            blog_id: blog.id,
            author_id,
            title: blog.title.as_str().to_owned(),
        };
        if let Err(error) = self.notifier.notify_author(&notification).await {
            tracing::warn!(
                %error,
                blog_id = blog.id.as_i64(),
                "failed to notify author"
            );
        }
        if let Err(error) = self.notifier.notify_followers(&notification).await {
            tracing::warn!(
                %error,
                blog_id = blog.id.as_i64(),
                "failed to notify followers"
            );
        }

        self.event_logger.log_event(
            context,
            "blog_published",
            &json!({
                "blog_id": blog.id.as_i64(),
                "author_id": author_id.as_i64(),
                "title": blog.title.as_str(),
            }),
        );

        Ok(blog)
    }

    /// Lists the blogs of one author, served from the listing cache when warm.
    pub async fn author_blogs(
        &self,
        context: &ContextSlot,
        author_id: AuthorId,
    ) -> AppResult<Vec<Blog>> {
        self.event_logger.log_event(
            context,
            "get_blogs_by_author",
            &json!({ "author_id": author_id.as_i64() }),
        );
        self.log_demo_event(context);

        let cache = self
            .listing_cache
            .as_ref()
            .filter(|_| self.listing_cache_ttl_seconds > 0);

        if let Some(cache) = cache {
            match cache.get_author_blogs(author_id).await {
                Ok(Some(blogs)) => return Ok(blogs),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        %error,
                        author_id = author_id.as_i64(),
                        "blog listing cache read failed"
                    );
                }
            }
        }

        let blogs = self.blog_repository.list_blogs_by_author(author_id).await?;

        if let Some(cache) = cache
            && let Err(error) = cache
                .set_author_blogs(author_id, &blogs, self.listing_cache_ttl_seconds)
                .await
        {
            tracing::warn!(
                %error,
                author_id = author_id.as_i64(),
                "blog listing cache write failed"
            );
        }

        Ok(blogs)
    }

    /// Fixed marker event emitted from a nested call; it shares the caller's
    /// transaction id without the id being passed along.
    fn log_demo_event(&self, context: &ContextSlot) {
        self.event_logger.log_event(context, "demo", &json!({ "author_id": 1 }));
    }

    /// Lists every blog, newest first.
    pub async fn all_blogs(&self) -> AppResult<Vec<Blog>> {
        self.blog_repository.list_blogs(None).await
    }

    /// Lists one page of blogs. Pages are 1-based.
    pub async fn blogs_page(&self, page: u32, page_size: Option<u32>) -> AppResult<Vec<Blog>> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_owned()));
        }
        if page_size == 0 {
            return Err(AppError::Validation(
                "page_size must be at least 1".to_owned(),
            ));
        }
        let limit = i64::from(page_size.min(MAX_PAGE_SIZE));
        let offset = (i64::from(page) - 1) * limit;

        self.blog_repository
            .list_blogs(Some(BlogPage { offset, limit }))
            .await
    }

    /// Counts all blogs.
    pub async fn total_blogs(&self) -> AppResult<i64> {
        self.blog_repository.count_blogs().await
    }
}
