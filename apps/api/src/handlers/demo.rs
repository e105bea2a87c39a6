use axum::Json;

use crate::dto::{MessageResponse, StatusResponse};

pub async fn hello_world_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        msg: "hello world!".to_owned(),
    })
}

/// Same greeting as the public route; only reachable with a valid token.
pub async fn hello_world_2_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        msg: "hello world!".to_owned(),
    })
}

/// Shared body of the throttled demo endpoints; the throttle layer decides.
pub async fn throttled_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "request was permitted".to_owned(),
    })
}
