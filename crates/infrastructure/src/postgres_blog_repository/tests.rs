use chrono::{Duration, SubsecRound, TimeZone, Utc};
use myblog_application::{
    AuthorRepository, BlogPage, BlogRepository, NewAuthor, NewBlog, PublishActivityRepository,
};
use myblog_core::{AppError, NonEmptyString};
use myblog_domain::{AuthorId, BlogTitle, CoverImage, EmailAddress, Tag};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{PostgresBlogRepository, utc_day_bounds};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres blog tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn new_author() -> NewAuthor {
    let email = format!("{}@example.com", unique("author"));
    match (NonEmptyString::new("Test Author"), EmailAddress::new(email)) {
        (Ok(name), Ok(email)) => NewAuthor {
            name,
            email,
            bio: String::new(),
        },
        _ => panic!("invalid test author"),
    }
}

fn new_blog(author_id: AuthorId, created_at: chrono::DateTime<Utc>) -> NewBlog {
    let Ok(title) = BlogTitle::new(unique("post")) else {
        panic!("invalid test title");
    };
    let tags = ["rust", "sql"]
        .into_iter()
        .filter_map(|name| Tag::new(name).ok())
        .collect();
    NewBlog {
        title,
        content: "Body".to_owned(),
        author_id,
        cover_image: CoverImage::new("https://example.com/cover.png").ok(),
        tags,
        created_at,
    }
}

#[test]
fn day_bounds_are_half_open_utc_midnights() {
    let date = Utc
        .with_ymd_and_hms(2026, 3, 14, 0, 0, 0)
        .single()
        .map(|instant| instant.date_naive());
    let Some(date) = date else {
        panic!("valid test date");
    };

    let Ok((start, end)) = utc_day_bounds(date) else {
        panic!("bounds for a valid date");
    };
    assert_eq!(start.to_rfc3339(), "2026-03-14T00:00:00+00:00");
    assert_eq!(end - start, Duration::days(1));
}

#[tokio::test]
async fn authors_round_trip_and_reject_duplicate_email() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresBlogRepository::new(pool);

    let input = new_author();
    let created = repository.create_author(input.clone()).await;
    assert!(created.is_ok());
    let Ok(created) = created else {
        return;
    };

    let found = repository.find_author(created.id()).await;
    assert!(found.is_ok_and(|author| author.as_ref() == Some(&created)));

    let duplicate = repository.create_author(input).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn daily_count_only_includes_the_requested_utc_day() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresBlogRepository::new(pool);
    let Ok(author) = repository.create_author(new_author()).await else {
        panic!("failed to create test author");
    };

    let Some(late_evening) = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).single() else {
        panic!("valid test instant");
    };
    let midnight = late_evening + Duration::seconds(1);

    for created_at in [late_evening, late_evening, midnight] {
        let created = repository.create_blog(new_blog(author.id(), created_at)).await;
        assert!(created.is_ok());
    }

    let day_one = repository
        .count_published_on(author.id(), late_evening.date_naive())
        .await;
    let day_two = repository
        .count_published_on(author.id(), midnight.date_naive())
        .await;

    assert!(day_one.is_ok_and(|count| count == 2));
    assert!(day_two.is_ok_and(|count| count == 1));
}

#[tokio::test]
async fn blogs_keep_tags_and_cover_and_reject_duplicate_title() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresBlogRepository::new(pool);
    let Ok(author) = repository.create_author(new_author()).await else {
        panic!("failed to create test author");
    };

    let input = new_blog(author.id(), Utc::now().trunc_subsecs(0));
    let Ok(created) = repository.create_blog(input.clone()).await else {
        panic!("failed to create test blog");
    };

    let listed = repository.list_blogs_by_author(author.id()).await;
    assert!(listed.is_ok_and(|blogs| blogs == vec![created.clone()]));

    let page = repository
        .list_blogs(Some(BlogPage {
            offset: 0,
            limit: 1,
        }))
        .await;
    assert!(page.is_ok_and(|blogs| blogs.len() == 1));

    let duplicate = repository.create_blog(input).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}
