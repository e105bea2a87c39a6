use myblog_application::PublishEligibility;
use myblog_domain::{Author, AuthorId};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for author creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/create-author-request.ts"
)]
pub struct CreateAuthorRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    #[ts(optional)]
    pub bio: Option<String>,
}

/// API representation of an author.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/author-response.ts"
)]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bio: String,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id().as_i64(),
            name: author.name().to_owned(),
            email: author.email().as_str().to_owned(),
            bio: author.bio().to_owned(),
        }
    }
}

/// Daily publish admission decision for one author.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/publish-eligibility-response.ts"
)]
pub struct PublishEligibilityResponse {
    pub author_id: i64,
    pub can_publish: bool,
    pub published_today: i64,
    pub daily_limit: i64,
    pub remaining: i64,
}

impl PublishEligibilityResponse {
    pub fn new(author_id: AuthorId, eligibility: PublishEligibility) -> Self {
        Self {
            author_id: author_id.as_i64(),
            can_publish: eligibility.allowed,
            published_today: eligibility.published_today,
            daily_limit: eligibility.daily_limit,
            remaining: eligibility.remaining(),
        }
    }
}
