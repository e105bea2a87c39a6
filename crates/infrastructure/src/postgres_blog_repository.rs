//! PostgreSQL-backed author and blog persistence.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use myblog_application::{
    AuthorRepository, BlogPage, BlogRepository, NewAuthor, NewBlog, PublishActivityRepository,
};
use myblog_core::{AppError, AppResult};
use myblog_domain::{Author, AuthorId, Blog, BlogId, BlogTitle, CoverImage, EmailAddress, Tag};

/// PostgreSQL implementation of the author, blog and publish activity ports.
#[derive(Clone)]
pub struct PostgresBlogRepository {
    pool: PgPool,
}

impl PostgresBlogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuthorRow {
    id: i64,
    name: String,
    email: String,
    bio: String,
}

impl TryFrom<AuthorRow> for Author {
    type Error = AppError;

    fn try_from(row: AuthorRow) -> Result<Self, Self::Error> {
        Author::new(
            AuthorId::new(row.id)?,
            row.name,
            EmailAddress::new(row.email)?,
            row.bio,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BlogRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    image_link: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogRow> for Blog {
    type Error = AppError;

    fn try_from(row: BlogRow) -> Result<Self, Self::Error> {
        Ok(Blog {
            id: BlogId::new(row.id)?,
            title: BlogTitle::new(row.title)?,
            content: row.content,
            author_id: AuthorId::new(row.author_id)?,
            cover_image: row.image_link.map(CoverImage::new).transpose()?,
            tags: row
                .tags
                .into_iter()
                .map(Tag::new)
                .collect::<AppResult<Vec<_>>>()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BLOG_SELECT: &str = r#"
    SELECT
        b.id,
        b.title,
        b.content,
        b.author_id,
        ci.image_link,
        COALESCE(
            array_agg(t.name ORDER BY t.name) FILTER (WHERE t.name IS NOT NULL),
            '{}'
        ) AS tags,
        b.created_at,
        b.updated_at
    FROM blogs b
    LEFT JOIN cover_images ci ON ci.id = b.cover_image_id
    LEFT JOIN blog_tags bt ON bt.blog_id = b.id
    LEFT JOIN tags t ON t.id = bt.tag_id
"#;

const BLOG_GROUP_ORDER: &str = r#"
    GROUP BY b.id, ci.image_link
    ORDER BY b.created_at DESC, b.id DESC
"#;

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(database_error)
        if database_error.code().as_deref() == Some("23505"))
}

fn rows_into_blogs(rows: Vec<BlogRow>) -> AppResult<Vec<Blog>> {
    rows.into_iter().map(Blog::try_from).collect()
}

/// Half-open `[start, end)` bounds of one UTC day.
fn utc_day_bounds(date: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = date
        .succ_opt()
        .ok_or_else(|| AppError::Validation(format!("date '{date}' is out of range")))?
        .and_time(NaiveTime::MIN)
        .and_utc();
    Ok((start, end))
}

async fn attach_tags(
    transaction: &mut Transaction<'_, Postgres>,
    blog_id: i64,
    tags: &[Tag],
) -> AppResult<()> {
    for tag in tags {
        let tag_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(tag.as_str())
        .fetch_one(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save tag '{}': {error}", tag.as_str()))
        })?;

        sqlx::query(
            r#"
            INSERT INTO blog_tags (blog_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(blog_id)
        .bind(tag_id)
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to tag blog '{blog_id}': {error}")))?;
    }

    Ok(())
}

#[async_trait]
impl AuthorRepository for PostgresBlogRepository {
    async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        let result = sqlx::query_as::<_, AuthorRow>(
            r#"
            INSERT INTO authors (name, email, bio)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, bio
            "#,
        )
        .bind(author.name.as_str())
        .bind(author.email.as_str())
        .bind(author.bio.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Author::try_from(row),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(format!(
                "author with email '{}' already exists",
                author.email.as_str()
            ))),
            Err(error) => Err(AppError::Internal(format!(
                "failed to create author: {error}"
            ))),
        }
    }

    async fn find_author(&self, author_id: AuthorId) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT id, name, email, bio
            FROM authors
            WHERE id = $1
            "#,
        )
        .bind(author_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load author '{author_id}': {error}"))
        })?;

        row.map(Author::try_from).transpose()
    }
}

#[async_trait]
impl BlogRepository for PostgresBlogRepository {
    async fn create_blog(&self, blog: NewBlog) -> AppResult<Blog> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to start transaction: {error}")))?;

        let cover_image_id = match &blog.cover_image {
            Some(cover_image) => Some(
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO cover_images (image_link)
                    VALUES ($1)
                    RETURNING id
                    "#,
                )
                .bind(cover_image.image_link())
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to save cover image: {error}"))
                })?,
            ),
            None => None,
        };

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO blogs (title, content, author_id, cover_image_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#,
        )
        .bind(blog.title.as_str())
        .bind(blog.content.as_str())
        .bind(blog.author_id.as_i64())
        .bind(cover_image_id)
        .bind(blog.created_at)
        .fetch_one(&mut *transaction)
        .await;

        let blog_id = match inserted {
            Ok(blog_id) => blog_id,
            Err(error) if is_unique_violation(&error) => {
                return Err(AppError::Conflict(format!(
                    "blog titled '{}' already exists",
                    blog.title.as_str()
                )));
            }
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to create blog: {error}"
                )));
            }
        };

        attach_tags(&mut transaction, blog_id, &blog.tags).await?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit blog: {error}")))?;

        Ok(Blog {
            id: BlogId::new(blog_id)?,
            title: blog.title,
            content: blog.content,
            author_id: blog.author_id,
            cover_image: blog.cover_image,
            tags: blog.tags,
            created_at: blog.created_at,
            updated_at: blog.created_at,
        })
    }

    async fn list_blogs_by_author(&self, author_id: AuthorId) -> AppResult<Vec<Blog>> {
        let query = format!("{BLOG_SELECT} WHERE b.author_id = $1 {BLOG_GROUP_ORDER}");
        let rows = sqlx::query_as::<_, BlogRow>(&query)
            .bind(author_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list blogs of author '{author_id}': {error}"
                ))
            })?;

        rows_into_blogs(rows)
    }

    async fn list_blogs(&self, page: Option<BlogPage>) -> AppResult<Vec<Blog>> {
        let rows = match page {
            Some(page) => {
                let query = format!("{BLOG_SELECT} {BLOG_GROUP_ORDER} LIMIT $1 OFFSET $2");
                sqlx::query_as::<_, BlogRow>(&query)
                    .bind(page.limit)
                    .bind(page.offset)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!("{BLOG_SELECT} {BLOG_GROUP_ORDER}");
                sqlx::query_as::<_, BlogRow>(&query)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to list blogs: {error}")))?;

        rows_into_blogs(rows)
    }

    async fn count_blogs(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blogs")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count blogs: {error}")))
    }
}

#[async_trait]
impl PublishActivityRepository for PostgresBlogRepository {
    async fn count_published_on(&self, author_id: AuthorId, date: NaiveDate) -> AppResult<i64> {
        let (day_start, day_end) = utc_day_bounds(date)?;

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM blogs
            WHERE author_id = $1
              AND created_at >= $2
              AND created_at < $3
            "#,
        )
        .bind(author_id.as_i64())
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count blogs of author '{author_id}' on {date}: {error}"
            ))
        })
    }
}

#[cfg(test)]
mod tests;
