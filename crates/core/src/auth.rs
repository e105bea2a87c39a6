use serde::{Deserialize, Serialize};

/// Authenticated API user resolved from a request token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: i64,
    username: String,
}

impl UserIdentity {
    /// Creates a user identity from a persisted user id and username.
    #[must_use]
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Returns the persisted user id.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the login name of the user.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}
