use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use myblog_application::{
    AuthorRepository, BlogPage, BlogRepository, NewAuthor, NewBlog, PublishActivityRepository,
};
use myblog_core::{AppError, AppResult};
use myblog_domain::{Author, AuthorId, Blog, BlogId};
use tokio::sync::RwLock;

/// In-memory author and blog store.
#[derive(Debug, Default)]
pub struct InMemoryBlogRepository {
    authors: RwLock<BTreeMap<AuthorId, Author>>,
    blogs: RwLock<BTreeMap<BlogId, Blog>>,
}

impl InMemoryBlogRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id<K, V>(entries: &BTreeMap<K, V>) -> i64 {
    i64::try_from(entries.len()).unwrap_or(i64::MAX - 1) + 1
}

fn newest_first(blogs: impl Iterator<Item = Blog>) -> Vec<Blog> {
    let mut blogs: Vec<Blog> = blogs.collect();
    blogs.sort_by(|left, right| {
        right
            .created_at
            .cmp(&left.created_at)
            .then_with(|| right.id.cmp(&left.id))
    });
    blogs
}

#[async_trait]
impl AuthorRepository for InMemoryBlogRepository {
    async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        let mut authors = self.authors.write().await;

        if authors
            .values()
            .any(|existing| existing.email() == &author.email)
        {
            return Err(AppError::Conflict(format!(
                "author with email '{}' already exists",
                author.email.as_str()
            )));
        }

        let id = AuthorId::new(next_id(&authors))?;
        let created = Author::new(id, author.name, author.email, author.bio)?;
        authors.insert(id, created.clone());
        Ok(created)
    }

    async fn find_author(&self, author_id: AuthorId) -> AppResult<Option<Author>> {
        Ok(self.authors.read().await.get(&author_id).cloned())
    }
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn create_blog(&self, blog: NewBlog) -> AppResult<Blog> {
        let mut blogs = self.blogs.write().await;

        if blogs.values().any(|existing| existing.title == blog.title) {
            return Err(AppError::Conflict(format!(
                "blog titled '{}' already exists",
                blog.title.as_str()
            )));
        }

        let id = BlogId::new(next_id(&blogs))?;
        let created = Blog {
            id,
            title: blog.title,
            content: blog.content,
            author_id: blog.author_id,
            cover_image: blog.cover_image,
            tags: blog.tags,
            created_at: blog.created_at,
            updated_at: blog.created_at,
        };
        blogs.insert(id, created.clone());
        Ok(created)
    }

    async fn list_blogs_by_author(&self, author_id: AuthorId) -> AppResult<Vec<Blog>> {
        let blogs = self.blogs.read().await;
        Ok(newest_first(
            blogs
                .values()
                .filter(|blog| blog.author_id == author_id)
                .cloned(),
        ))
    }

    async fn list_blogs(&self, page: Option<BlogPage>) -> AppResult<Vec<Blog>> {
        let blogs = newest_first(self.blogs.read().await.values().cloned());
        let Some(page) = page else {
            return Ok(blogs);
        };

        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(blogs.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_blogs(&self) -> AppResult<i64> {
        Ok(i64::try_from(self.blogs.read().await.len()).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl PublishActivityRepository for InMemoryBlogRepository {
    async fn count_published_on(&self, author_id: AuthorId, date: NaiveDate) -> AppResult<i64> {
        let count = self
            .blogs
            .read()
            .await
            .values()
            .filter(|blog| blog.author_id == author_id && blog.published_on() == date)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use myblog_application::{
        AuthorRepository, BlogPage, BlogRepository, NewAuthor, NewBlog,
        PublishActivityRepository,
    };
    use myblog_core::{AppError, AppResult, NonEmptyString};
    use myblog_domain::{AuthorId, BlogTitle, EmailAddress};

    use super::InMemoryBlogRepository;

    fn author(email: &str) -> AppResult<NewAuthor> {
        Ok(NewAuthor {
            name: NonEmptyString::new("Grace")?,
            email: EmailAddress::new(email)?,
            bio: String::new(),
        })
    }

    fn blog(author_id: AuthorId, title: &str, created_at: DateTime<Utc>) -> AppResult<NewBlog> {
        Ok(NewBlog {
            title: BlogTitle::new(title)?,
            content: String::new(),
            author_id,
            cover_image: None,
            tags: Vec::new(),
            created_at,
        })
    }

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    #[tokio::test]
    async fn author_email_is_unique() -> AppResult<()> {
        let repository = InMemoryBlogRepository::new();
        let created = repository.create_author(author("grace@example.com")?).await?;

        assert_eq!(created.id().as_i64(), 1);
        assert!(matches!(
            repository.create_author(author("grace@example.com")?).await,
            Err(AppError::Conflict(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn listings_are_newest_first_and_paged() -> AppResult<()> {
        let repository = InMemoryBlogRepository::new();
        let author_id = repository
            .create_author(author("grace@example.com")?)
            .await?
            .id();

        for (hour, title) in [(8, "Morning"), (12, "Noon"), (18, "Evening")] {
            repository
                .create_blog(blog(author_id, title, instant(hour))?)
                .await?;
        }

        let titles = |blogs: Vec<myblog_domain::Blog>| {
            blogs
                .into_iter()
                .map(|blog| blog.title.as_str().to_owned())
                .collect::<Vec<_>>()
        };
        assert_eq!(
            titles(repository.list_blogs(None).await?),
            vec!["Evening", "Noon", "Morning"]
        );
        assert_eq!(
            titles(
                repository
                    .list_blogs(Some(BlogPage {
                        offset: 1,
                        limit: 1
                    }))
                    .await?
            ),
            vec!["Noon"]
        );
        assert_eq!(repository.count_blogs().await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn daily_count_is_scoped_to_author_and_utc_date() -> AppResult<()> {
        let repository = InMemoryBlogRepository::new();
        let first = repository
            .create_author(author("first@example.com")?)
            .await?
            .id();
        let second = repository
            .create_author(author("second@example.com")?)
            .await?
            .id();

        repository.create_blog(blog(first, "A", instant(9))?).await?;
        repository.create_blog(blog(first, "B", instant(23))?).await?;
        repository
            .create_blog(blog(first, "C", instant(23) + Duration::hours(1))?)
            .await?;
        repository.create_blog(blog(second, "D", instant(10))?).await?;

        let day = instant(0).date_naive();
        assert_eq!(repository.count_published_on(first, day).await?, 2);
        assert_eq!(repository.count_published_on(second, day).await?, 1);
        assert!(matches!(
            repository.create_blog(blog(second, "A", instant(11))?).await,
            Err(AppError::Conflict(_))
        ));
        Ok(())
    }
}
