//! MyBlog API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;

use myblog_core::AppError;
use tracing::info;

use crate::api_config::{ApiCommand, ApiConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            Ok(())
        }
        ApiCommand::TotalBlogs => {
            let app_state = api_services::build_app_state(pool, &config)?;
            let total = app_state.blog_service.total_blogs().await?;
            println!("Total blogs: {total}");
            Ok(())
        }
        ApiCommand::CreateUser {
            ref username,
            ref password,
        } => {
            let app_state = api_services::build_app_state(pool, &config)?;
            let identity = app_state
                .auth_service
                .register_user(username, password.expose())
                .await?;
            info!(user_id = identity.user_id(), username = identity.username(), "user created");
            Ok(())
        }
        ApiCommand::Serve => serve(pool, &config).await,
    }
}

async fn serve(pool: sqlx::PgPool, config: &ApiConfig) -> Result<(), AppError> {
    let app_state = api_services::build_app_state(pool, config)?;
    api_services::spawn_rate_limit_cleanup(
        app_state.rate_limit_service.clone(),
        config.rate_limit_cleanup_interval,
    );
    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "myblog-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
