//! Token authentication ports and application service.
//!
//! Callers authenticate with `Authorization: Token <key>`. Only the SHA-256
//! hash of a key is ever persisted.

mod token_crypto;

use std::sync::Arc;

use async_trait::async_trait;

use myblog_core::{AppError, AppResult, UserIdentity};
use myblog_domain::{Username, validate_password};

/// User record returned by repository queries.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Numeric user identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Creates a user. Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<UserRecord>;
}

/// Repository port for API token hashes.
#[async_trait]
pub trait ApiTokenRepository: Send + Sync {
    /// Stores a token hash for the given user.
    async fn store_token(&self, user_id: i64, token_hash: &str) -> AppResult<()>;

    /// Resolves the user owning a token hash.
    async fn find_identity_by_token_hash(&self, token_hash: &str)
    -> AppResult<Option<UserIdentity>>;
}

/// Port for password hashing operations. Keeps the application layer free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// A freshly issued API token. The raw key is only available here.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Raw token to hand to the client.
    pub token: String,
    /// Identity the token authenticates.
    pub identity: UserIdentity,
}

/// Application service for username/password login and token lookup.
#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    token_repository: Arc<dyn ApiTokenRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        token_repository: Arc<dyn ApiTokenRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            token_repository,
            password_hasher,
        }
    }

    /// Registers a user with a hashed password.
    pub async fn register_user(&self, username: &str, password: &str) -> AppResult<UserIdentity> {
        let username = Username::new(username)?;
        validate_password(password)?;

        if self
            .user_repository
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                username.as_str()
            )));
        }

        let password_hash = self.password_hasher.hash_password(password)?;
        let user = self
            .user_repository
            .create_user(username.as_str(), &password_hash)
            .await?;

        Ok(UserIdentity::new(user.id, user.username))
    }

    /// Verifies credentials and issues a new token.
    ///
    /// Returns `None` for unknown users and wrong passwords alike.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Option<IssuedToken>> {
        let Some(user) = self.user_repository.find_by_username(username).await? else {
            // Hash anyway so unknown usernames take as long as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            tracing::debug!("login rejected for unknown username");
            return Ok(None);
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            tracing::debug!(user_id = user.id, "login rejected for wrong password");
            return Ok(None);
        }

        let (token, token_hash) = token_crypto::generate_token()?;
        self.token_repository
            .store_token(user.id, &token_hash)
            .await?;
        tracing::info!(user_id = user.id, "api token issued");

        Ok(Some(IssuedToken {
            token,
            identity: UserIdentity::new(user.id, user.username),
        }))
    }

    /// Resolves the identity behind a raw token.
    pub async fn authenticate(&self, raw_token: &str) -> AppResult<Option<UserIdentity>> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Ok(None);
        }

        self.token_repository
            .find_identity_by_token_hash(&token_crypto::hash_token(raw_token))
            .await
    }
}

#[cfg(test)]
mod tests;
