use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use myblog_application::RateLimitRule;
use myblog_core::{AppError, ContextSlot, UserIdentity};
use tracing::Instrument;

use crate::error::ApiResult;
use crate::state::AppState;

/// Response header carrying the request's transaction id.
pub const TRANSACTION_ID_HEADER: &str = "x-transaction-id";

const TOKEN_SCHEME: &str = "Token ";

/// Throttle attached to a group of routes.
#[derive(Debug, Clone)]
pub enum Throttle {
    /// Limits unauthenticated callers only, keyed by client IP.
    Anonymous(RateLimitRule),
    /// Limits every caller within a named scope, keyed by user id or client IP.
    Scoped(RateLimitRule),
}

impl Throttle {
    fn rule(&self) -> &RateLimitRule {
        match self {
            Self::Anonymous(rule) | Self::Scoped(rule) => rule,
        }
    }
}

/// Attaches the [`UserIdentity`] behind an `Authorization: Token <key>` header.
///
/// Requests without token credentials pass through anonymously; a token that
/// does not resolve is rejected.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    if let Some(raw_token) = token_from_headers(request.headers()) {
        let identity = state
            .auth_service
            .authenticate(&raw_token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid token".to_owned()))?;
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}

pub async fn require_auth(request: Request, next: Next) -> ApiResult<Response> {
    if request.extensions().get::<UserIdentity>().is_none() {
        return Err(AppError::Unauthorized(
            "authentication credentials were not provided".to_owned(),
        )
        .into());
    }

    Ok(next.run(request).await)
}

/// Binds a fresh request context for the lifetime of one request.
///
/// The guard is dropped when the inner service finishes, panics or is
/// cancelled, so the slot never outlives the request.
pub async fn populate_request_context(mut request: Request, next: Next) -> Response {
    let user_id = request
        .extensions()
        .get::<UserIdentity>()
        .map(UserIdentity::user_id);

    let context = ContextSlot::new();
    let guard = context.enter(user_id);
    let transaction_id = context
        .current_transaction_id()
        .map(|transaction_id| transaction_id.to_string())
        .unwrap_or_default();
    request.extensions_mut().insert(context);

    let span = tracing::info_span!("request", txid = %transaction_id, uid = user_id);
    let mut response = next.run(request).instrument(span).await;
    drop(guard);

    if let Ok(value) = HeaderValue::from_str(&transaction_id) {
        response.headers_mut().insert(TRANSACTION_ID_HEADER, value);
    }

    response
}

pub async fn throttle(
    State(state): State<AppState>,
    Extension(throttle): Extension<Throttle>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = request.extensions().get::<UserIdentity>();
    let key = match (&throttle, identity) {
        (Throttle::Anonymous(_), Some(_)) => None,
        (_, Some(identity)) => Some(format!("user:{}", identity.user_id())),
        (_, None) => Some(format!("ip:{}", client_ip(&request))),
    };

    if let Some(key) = key {
        state
            .rate_limit_service
            .check_rate_limit(throttle.rule(), &key)
            .await?;
    }

    Ok(next.run(request).await)
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(TOKEN_SCHEME))
        .map(|token| token.trim().to_owned())
}

fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(forwarded) = forwarded {
        return forwarded.to_owned();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}
