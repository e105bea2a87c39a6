//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod author;
mod blog;
mod publish;
mod user;

pub use author::{AUTHOR_NAME_MAX_LENGTH, Author, AuthorId, validate_author_name};
pub use blog::{
    BLOG_TITLE_MAX_LENGTH, Blog, BlogId, BlogTitle, CoverImage, TAG_NAME_MAX_LENGTH, Tag,
    normalize_tags,
};
pub use publish::{DAILY_PUBLISH_QUOTA, PublishQuota};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, USERNAME_MAX_LENGTH, Username,
    validate_password,
};
