use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Credentials exchanged for an API token.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Freshly issued API token. Send it back as `Authorization: Token <token>`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub token: String,
}
