//! Token endpoint handler.
//!
//! Exchanges authorization codes for bearer tokens. The endpoint always
//! answers with a JSON body, a success payload or the error triple, and
//! marks every response uncacheable since both carry credentials.

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AuthError;
use crate::oauth::token::{
    validate_token_exchange, ErrorBody, TokenExchangeRequest, TokenResponse,
};

use super::OAuthState;

/// GET /token handler.
pub async fn token_handler(
    State(state): State<OAuthState>,
    Query(params): Query<TokenExchangeRequest>,
) -> Response {
    token_exchange_response(&state, &params).await
}

/// Runs a token exchange and renders the JSON response.
pub(super) async fn token_exchange_response(
    state: &OAuthState,
    params: &TokenExchangeRequest,
) -> Response {
    let result = exchange(state, params).await;
    let response = match result {
        Ok(issued) => Json(issued).into_response(),
        Err(err) => {
            tracing::debug!(
                error = %err.oauth_error_code(),
                category = %err.category(),
                "Token exchange failed"
            );
            let config = state.engine.store().config();
            let body = ErrorBody::from_error(&err, config.error_uri(err.oauth_error_code()));
            Json(body).into_response()
        }
    };
    uncacheable(response)
}

async fn exchange(
    state: &OAuthState,
    params: &TokenExchangeRequest,
) -> Result<TokenResponse, AuthError> {
    if let Some(err) = validate_token_exchange(params) {
        return Err(err);
    }
    let issued = state
        .engine
        .store()
        .exchange_code(&params.code, &params.redirect_uri)
        .await?;
    Ok(TokenResponse {
        token: issued.token,
        token_type: issued.token_type,
        expires_in: issued.expires_in,
    })
}

fn uncacheable(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}
