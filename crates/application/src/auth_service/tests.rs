use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use myblog_core::{AppError, AppResult, UserIdentity};
use tokio::sync::RwLock;

use super::token_crypto::{generate_token, hash_token};
use super::{ApiTokenRepository, AuthService, PasswordHasher, UserRecord, UserRepository};

#[derive(Default)]
struct FakeUsers {
    users: RwLock<Vec<UserRecord>>,
    tokens: RwLock<HashMap<String, i64>>,
}

#[async_trait]
impl UserRepository for FakeUsers {
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
        let record = UserRecord {
            id: i64::try_from(users.len()).unwrap_or(i64::MAX) + 1,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        users.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl ApiTokenRepository for FakeUsers {
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
            .map(|user| UserIdentity::new(user.id, user.username.clone())))
    }
}

struct ReversingHasher;

impl PasswordHasher for ReversingHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(password.chars().rev().collect())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(self.hash_password(password)? == hash)
    }
}

fn service() -> (AuthService, Arc<FakeUsers>) {
    let store = Arc::new(FakeUsers::default());
    (
        AuthService::new(store.clone(), store.clone(), Arc::new(ReversingHasher)),
        store,
    )
}

const PASSWORD: &str = "correct horse battery";

#[test]
fn generated_tokens_are_random_hex_with_matching_hash() -> AppResult<()> {
    let (first, first_hash) = generate_token()?;
    let (second, _) = generate_token()?;

    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|character| character.is_ascii_hexdigit()));
    assert_ne!(first, second);
    assert_eq!(first_hash, hash_token(&first));
    assert_ne!(first_hash, first);
    Ok(())
}

#[test]
fn hash_token_is_sha256_hex() {
    assert_eq!(
        hash_token("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn login_issues_token_that_authenticates() -> AppResult<()> {
    let (service, store) = service();
    let registered = service.register_user("ada", PASSWORD).await?;

    let issued = service.login("ada", PASSWORD).await?;
    let Some(issued) = issued else {
        panic!("expected a token for valid credentials");
    };

    assert_eq!(issued.identity, registered);
    assert!(!store.tokens.read().await.contains_key(&issued.token));
    assert_eq!(
        service.authenticate(&issued.token).await?,
        Some(registered)
    );
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_get_no_token() -> AppResult<()> {
    let (service, store) = service();
    service.register_user("ada", PASSWORD).await?;

    assert!(service.login("ada", "wrong password!").await?.is_none());
    assert!(service.login("grace", PASSWORD).await?.is_none());
    assert!(store.tokens.read().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_or_blank_tokens_do_not_authenticate() -> AppResult<()> {
    let (service, _) = service();

    assert_eq!(service.authenticate("deadbeef").await?, None);
    assert_eq!(service.authenticate("   ").await?, None);
    Ok(())
}

#[tokio::test]
async fn registration_validates_and_rejects_duplicates() -> AppResult<()> {
    let (service, _) = service();
    service.register_user("ada", PASSWORD).await?;

    assert!(matches!(
        service.register_user("ada", PASSWORD).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        service.register_user("bob", "short").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service.register_user("bad name", PASSWORD).await,
        Err(AppError::Validation(_))
    ));
    Ok(())
}
