use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;

use crate::handlers;
use crate::middleware::{self, Throttle};
use crate::state::AppState;

pub(super) fn build_anon_routes(app_state: AppState) -> Router<AppState> {
    let throttle = Throttle::Anonymous(app_state.throttle.anon.clone());

    Router::new()
        .route("/api/throttle/anon", get(handlers::demo::throttled_handler))
        .route_layer(from_fn_with_state(app_state, middleware::throttle))
        .layer(axum::Extension(throttle))
}

pub(super) fn build_blog_limit_routes(app_state: AppState) -> Router<AppState> {
    let throttle = Throttle::Scoped(app_state.throttle.blog.clone());

    Router::new()
        .route("/api/throttle/blog", get(handlers::demo::throttled_handler))
        .route(
            "/api/throttle/blog-detail",
            get(handlers::demo::throttled_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::throttle))
        .layer(axum::Extension(throttle))
}

pub(super) fn build_blog_2_limit_routes(app_state: AppState) -> Router<AppState> {
    let throttle = Throttle::Scoped(app_state.throttle.blog_2.clone());

    Router::new()
        .route(
            "/api/throttle/blog-2",
            get(handlers::demo::throttled_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::throttle))
        .layer(axum::Extension(throttle))
}
