//! PostgreSQL-backed API users and token hashes.

use async_trait::async_trait;
use sqlx::PgPool;

use myblog_application::{ApiTokenRepository, UserRecord, UserRepository};
use myblog_core::{AppError, AppResult, UserIdentity};

/// PostgreSQL implementation of the user and API token ports.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<UserRecord> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(database_error))
                if database_error.code().as_deref() == Some("23505") =>
            {
                Err(AppError::Conflict(format!(
                    "username '{username}' is already taken"
                )))
            }
            Err(error) => Err(AppError::Internal(format!(
                "failed to create user: {error}"
            ))),
        }
    }
}

#[async_trait]
impl ApiTokenRepository for PostgresUserRepository {
    async fn store_token(&self, user_id: i64, token_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO api_tokens (token_hash, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store api token: {error}")))?;

        Ok(())
    }

    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT u.id, u.username
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve api token: {error}")))?;

        Ok(row.map(|(user_id, username)| UserIdentity::new(user_id, username)))
    }
}
