//! Authorization endpoint handler.
//!
//! ```text
//! GET /authorize?client_id=...&response_type=...&redirect_uri=...
//!     ├─► unusable request (no safe redirect) → JSON error, no redirect
//!     ├─► infrastructure failure after target established → 302 with error
//!     └─► handed to the Authenticator → its response (302 on completion)
//! ```

use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationRequest;
use crate::oauth::flow::AuthorizeOutcome;
use crate::oauth::token::{ErrorBody, TokenExchangeRequest};

use super::token::token_exchange_response;
use super::OAuthState;

/// GET /authorize handler.
pub async fn authorize_handler(
    State(state): State<OAuthState>,
    Query(params): Query<AuthorizationRequest>,
) -> Response {
    match state.engine.authorize(&params).await {
        AuthorizeOutcome::ErrorPage(err) => error_page(&state, &err),
        AuthorizeOutcome::ErrorRedirect(response) | AuthorizeOutcome::Pending(response) => response,
    }
}

/// Combined endpoint handler.
///
/// Dispatches on the presence of `response_type`: requests carrying one are
/// authorization requests, everything else is treated as a token exchange.
/// For embedders that expose a single OAuth path.
pub async fn master_handler(
    State(state): State<OAuthState>,
    RawQuery(raw): RawQuery,
) -> Response {
    let raw = raw.unwrap_or_default();
    let has_response_type = url::form_urlencoded::parse(raw.as_bytes())
        .any(|(key, value)| key == "response_type" && !value.is_empty());

    if has_response_type {
        let params: AuthorizationRequest =
            serde_urlencoded::from_str(&raw).unwrap_or_default();
        authorize_handler(State(state), Query(params)).await
    } else {
        let params: TokenExchangeRequest =
            serde_urlencoded::from_str(&raw).unwrap_or_default();
        token_exchange_response(&state, &params).await
    }
}

/// Renders an error that must not be delivered by redirect.
///
/// Embedders wanting a branded page should match on
/// [`AuthorizeOutcome::ErrorPage`] themselves; this default keeps the error
/// structured.
fn error_page(state: &OAuthState, error: &AuthError) -> Response {
    let status = if error.is_server_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    let config = state.engine.store().config();
    let body = ErrorBody::from_error(error, config.error_uri(error.oauth_error_code()));
    (status, Json(body)).into_response()
}
