use std::error::Error;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use myblog_application::{
    AuthService, BlogService, Clock, EventLogger, LogLevel, LogSink, PublishGateService,
    RateLimitRule, RateLimitService,
};
use myblog_core::{AppError, AppResult};
use myblog_infrastructure::{
    Argon2PasswordHasher, ConsolePublishNotifier, InMemoryBlogListingCache,
    InMemoryBlogRepository, InMemoryRateLimitRepository, InMemoryUserRepository,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_router;
use crate::api_config::ThrottleRates;
use crate::middleware::TRANSACTION_ID_HEADER;
use crate::state::AppState;

type TestResult<T = ()> = Result<T, Box<dyn Error>>;

const PASSWORD: &str = "quiet meadow lantern";

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<Value>>,
}

impl RecordingSink {
    fn event(&self, name: &str) -> Option<Value> {
        self.lines
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|record| record["event"] == name)
            .cloned()
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, _channel: &str, _level: LogLevel, line: &str) -> AppResult<()> {
        let record = serde_json::from_str(line)
            .map_err(|error| AppError::Internal(format!("invalid event line: {error}")))?;
        self.lines
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock sink: {error}")))?
            .push(record);
        Ok(())
    }
}

struct TestApp {
    router: Router,
    auth_service: AuthService,
    events: Arc<RecordingSink>,
}

fn test_app() -> TestResult<TestApp> {
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
            .single()
            .ok_or("invalid fixture instant")?,
    ));
    let blogs = Arc::new(InMemoryBlogRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let events = Arc::new(RecordingSink::default());

    let blog_service = BlogService::new(
        blogs.clone(),
        blogs.clone(),
        PublishGateService::new(blogs, clock.clone()),
        Arc::new(ConsolePublishNotifier::new()),
        EventLogger::new(events.clone(), "myblog-test"),
        clock,
    )
    .with_listing_cache(Arc::new(InMemoryBlogListingCache::new()), 600);

    let auth_service = AuthService::new(
        users.clone(),
        users,
        Arc::new(Argon2PasswordHasher::new()),
    );

    let state = AppState {
        blog_service,
        auth_service: auth_service.clone(),
        rate_limit_service: RateLimitService::new(Arc::new(InMemoryRateLimitRepository::new())),
        throttle: ThrottleRates {
            anon: RateLimitRule::new("anon", 3, 60),
            ..ThrottleRates::default()
        },
        postgres_pool: None,
        redis_client: None,
        redis_required: false,
    };

    Ok(TestApp {
        router: build_router(state),
        auth_service,
        events,
    })
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResult<(StatusCode, HeaderMap, Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, headers, value))
}

async fn login(app: &TestApp) -> TestResult<String> {
    app.auth_service.register_user("grace", PASSWORD).await?;

    let (status, _, body) = send(
        &app.router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "grace", "password": PASSWORD })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(body["token"]
        .as_str()
        .ok_or("login response without token")?
        .to_owned())
}

async fn create_author(app: &TestApp, email: &str) -> TestResult<i64> {
    let (status, _, body) = send(
        &app.router,
        Method::POST,
        "/api/authors",
        None,
        Some(json!({ "name": "Grace Hopper", "email": email })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    Ok(body["id"].as_i64().ok_or("author response without id")?)
}

#[tokio::test]
async fn hello_world_carries_a_fresh_transaction_id() -> TestResult {
    let app = test_app()?;

    let (status, first_headers, body) =
        send(&app.router, Method::GET, "/api/hello-world", None, None).await?;
    let (_, second_headers, _) =
        send(&app.router, Method::GET, "/api/hello-world", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "hello world!" }));

    let first = first_headers
        .get(TRANSACTION_ID_HEADER)
        .ok_or("missing transaction id")?;
    let second = second_headers
        .get(TRANSACTION_ID_HEADER)
        .ok_or("missing transaction id")?;
    assert_eq!(first.len(), 36);
    assert_ne!(first, second);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> TestResult {
    let app = test_app()?;

    let (status, _, body) =
        send(&app.router, Method::GET, "/api/hello-world-2", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _, _) = send(
        &app.router,
        Method::GET,
        "/api/hello-world-2",
        Some("not-a-real-token"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await?;
    let (status, _, body) = send(
        &app.router,
        Method::GET,
        "/api/hello-world-2",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "hello world!" }));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> TestResult {
    let app = test_app()?;
    app.auth_service.register_user("grace", PASSWORD).await?;

    let (status, _, _) = send(
        &app.router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "grace", "password": "another long phrase" })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn events_carry_the_caller_and_the_response_transaction_id() -> TestResult {
    let app = test_app()?;
    let token = login(&app).await?;
    let user_id = app
        .auth_service
        .authenticate(&token)
        .await?
        .ok_or("token does not resolve to a user")?
        .user_id();

    let (status, headers, body) = send(
        &app.router,
        Method::POST,
        "/api/authors",
        None,
        Some(json!({ "name": "Grace Hopper", "email": "grace@example.com" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let author_id = body["id"].as_i64().ok_or("author response without id")?;

    let created = app.events.event("author_created").ok_or("missing author_created")?;
    assert!(created.get("uid").is_none());
    assert_eq!(
        created["txid"].as_str(),
        headers.get(TRANSACTION_ID_HEADER).map(|value| value.to_str()).transpose()?
    );

    let (status, headers, _) = send(
        &app.router,
        Method::POST,
        "/api/blogs/publish",
        Some(&token),
        Some(json!({
            "author_id": author_id,
            "title": "Traced",
            "content": "Every event knows its request.",
            "tags": ["rust"],
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let published = app.events.event("blog_published").ok_or("missing blog_published")?;
    assert_eq!(published["uid"], json!(user_id));
    assert_eq!(
        published["txid"].as_str(),
        headers.get(TRANSACTION_ID_HEADER).map(|value| value.to_str()).transpose()?
    );
    Ok(())
}

#[tokio::test]
async fn eleventh_publish_of_the_day_is_rate_limited() -> TestResult {
    let app = test_app()?;
    let token = login(&app).await?;
    let author_id = create_author(&app, "grace@example.com").await?;

    for index in 0..10 {
        let (status, _, body) = send(
            &app.router,
            Method::POST,
            "/api/blogs/publish",
            Some(&token),
            Some(json!({
                "author_id": author_id,
                "title": format!("Notes {index}"),
                "content": "Compilers all the way down.",
                "tags": ["Rust", "compilers"],
            })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["tags"], json!(["compilers", "rust"]));
    }

    let (status, _, body) = send(
        &app.router,
        Method::POST,
        "/api/blogs/publish",
        Some(&token),
        Some(json!({
            "author_id": author_id,
            "title": "One too many",
            "content": "",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"].is_string());

    let (status, _, body) = send(
        &app.router,
        Method::GET,
        &format!("/api/authors/{author_id}/can-publish"),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_publish"], json!(false));
    assert_eq!(body["published_today"], json!(10));
    assert_eq!(body["remaining"], json!(0));

    let (_, _, body) = send(&app.router, Method::GET, "/api/blogs/total", None, None).await?;
    assert_eq!(body, json!({ "total": 10 }));
    Ok(())
}

#[tokio::test]
async fn publishing_requires_authentication() -> TestResult {
    let app = test_app()?;
    let author_id = create_author(&app, "grace@example.com").await?;

    let (status, _, _) = send(
        &app.router,
        Method::POST,
        "/api/blogs/publish",
        None,
        Some(json!({ "author_id": author_id, "title": "Anonymous", "content": "" })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn listings_reflect_new_publications() -> TestResult {
    let app = test_app()?;
    let token = login(&app).await?;
    let author_id = create_author(&app, "grace@example.com").await?;
    let by_author = format!("/api/blogs/by-author?author_id={author_id}");

    let (status, _, body) = send(&app.router, Method::GET, &by_author, None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "blogs": [] }));

    for title in ["First", "Second", "Third"] {
        send(
            &app.router,
            Method::POST,
            "/api/blogs/publish",
            Some(&token),
            Some(json!({ "author_id": author_id, "title": title, "content": "..." })),
        )
        .await?;
    }

    let (_, _, body) = send(&app.router, Method::GET, &by_author, None, None).await?;
    assert_eq!(body["blogs"].as_array().map(Vec::len), Some(3));

    let (_, _, body) = send(
        &app.router,
        Method::GET,
        "/api/blogs/paginated?page=2&page_size=2",
        None,
        None,
    )
    .await?;
    assert_eq!(body["blogs"].as_array().map(Vec::len), Some(1));

    let (status, _, _) = send(
        &app.router,
        Method::GET,
        "/api/blogs/paginated?page=0",
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app.router, Method::GET, "/api/blogs", None, None).await?;
    assert_eq!(body["blogs"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn unknown_author_cannot_publish() -> TestResult {
    let app = test_app()?;

    let (status, _, _) = send(
        &app.router,
        Method::GET,
        "/api/authors/404/can-publish",
        None,
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn scoped_throttle_is_shared_across_its_routes() -> TestResult {
    let app = test_app()?;

    for _ in 0..2 {
        let (status, _, body) =
            send(&app.router, Method::GET, "/api/throttle/blog-2", None, None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "request was permitted" }));
    }
    let (status, _, _) = send(&app.router, Method::GET, "/api/throttle/blog-2", None, None).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    for uri in ["/api/throttle/blog", "/api/throttle/blog-detail"]
        .iter()
        .cycle()
        .take(10)
    {
        let (status, _, _) = send(&app.router, Method::GET, uri, None, None).await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _, _) =
        send(&app.router, Method::GET, "/api/throttle/blog-detail", None, None).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    Ok(())
}

#[tokio::test]
async fn anonymous_throttle_skips_authenticated_callers() -> TestResult {
    let app = test_app()?;
    let token = login(&app).await?;

    for _ in 0..3 {
        let (status, _, _) =
            send(&app.router, Method::GET, "/api/throttle/anon", None, None).await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _, _) = send(&app.router, Method::GET, "/api/throttle/anon", None, None).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _, _) = send(
        &app.router,
        Method::GET,
        "/api/throttle/anon",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_reports_disabled_backends_as_ready() -> TestResult {
    let app = test_app()?;

    let (status, _, body) = send(&app.router, Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], json!(true));
    assert_eq!(body["postgres"], json!({ "status": "disabled" }));
    assert_eq!(body["redis"], json!({ "status": "disabled" }));
    Ok(())
}
