use std::collections::HashMap;

use async_trait::async_trait;
use myblog_application::{ApiTokenRepository, UserRecord, UserRepository};
use myblog_core::{AppError, AppResult, UserIdentity};
use tokio::sync::RwLock;

/// In-memory user and API token store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<UserRecord>>,
    tokens: RwLock<HashMap<String, i64>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.iter().any(|user| user.username == username) {
            return Err(AppError::Conflict(format!(
                "username '{username}' is already taken"
            )));
        }

        let user = UserRecord {
            id: i64::try_from(users.len()).unwrap_or(i64::MAX - 1) + 1,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ApiTokenRepository for InMemoryUserRepository {
    async fn store_token(&self, user_id: i64, token_hash: &str) -> AppResult<()> {
        self.tokens
            .write()
            .await
            .insert(token_hash.to_owned(), user_id);
        Ok(())
    }

    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<UserIdentity>> {
        let Some(user_id) = self.tokens.read().await.get(token_hash).copied() else {
            return Ok(None);
        };

        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| UserIdentity::new(user.id, user.username.as_str())))
    }
}
