//! Author domain types.

use std::fmt::{Display, Formatter};

use myblog_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::user::EmailAddress;

/// Maximum number of characters in an author name.
pub const AUTHOR_NAME_MAX_LENGTH: usize = 100;

/// Persisted identifier of an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(i64);

impl AuthorId {
    /// Creates an author identifier from a database key.
    pub fn new(value: i64) -> AppResult<Self> {
        if value <= 0 {
            return Err(AppError::Validation(format!(
                "author id must be positive, got {value}"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying database key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for AuthorId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A blog author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    id: AuthorId,
    name: NonEmptyString,
    email: EmailAddress,
    bio: String,
}

impl Author {
    /// Creates a validated author.
    pub fn new(
        id: AuthorId,
        name: impl Into<String>,
        email: EmailAddress,
        bio: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: validate_author_name(name)?,
            email,
            bio: bio.into(),
        })
    }

    /// Returns the author identifier.
    #[must_use]
    pub fn id(&self) -> AuthorId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the unique contact email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the free-form biography.
    #[must_use]
    pub fn bio(&self) -> &str {
        self.bio.as_str()
    }
}

/// Validates an author name before it is persisted.
pub fn validate_author_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name = NonEmptyString::new(name.into().trim())?;
    if name.as_str().chars().count() > AUTHOR_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "author name must not exceed {AUTHOR_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name)
}
