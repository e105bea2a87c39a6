use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod throttled;

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/hello-world-2",
            get(handlers::demo::hello_world_2_handler),
        )
        .route(
            "/api/blogs/publish",
            post(handlers::blogs::publish_blog_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .route("/api/hello-world", get(handlers::demo::hello_world_handler))
        .route("/api/blogs", get(handlers::blogs::list_blogs_handler))
        .route(
            "/api/blogs/paginated",
            get(handlers::blogs::paginated_blogs_handler),
        )
        .route(
            "/api/blogs/by-author",
            get(handlers::blogs::author_blogs_handler),
        )
        .route("/api/blogs/total", get(handlers::blogs::total_blogs_handler))
        .route(
            "/api/authors",
            post(handlers::authors::create_author_handler),
        )
        .route(
            "/api/authors/{author_id}/can-publish",
            get(handlers::authors::can_publish_handler),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(throttled::build_anon_routes(app_state.clone()))
        .merge(throttled::build_blog_limit_routes(app_state.clone()))
        .merge(throttled::build_blog_2_limit_routes(app_state.clone()))
        .layer(from_fn(middleware::populate_request_context))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests;
