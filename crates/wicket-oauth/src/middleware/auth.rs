//! Bearer token verification extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use wicket_oauth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(token): BearerAuth) -> String {
//!     format!("authorized with {token}")
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::store::TokenStore;

/// State required for bearer token verification.
///
/// Include this in your application state and expose it to the
/// [`BearerAuth`] extractor via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Store holding the issued tokens.
    pub store: Arc<TokenStore>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }
}

/// Axum extractor that verifies the `Authorization: Bearer` header.
///
/// On success it carries the verified token. Every rejection is a 401 with
/// a `WWW-Authenticate` challenge:
///
/// - missing or malformed `Authorization` header → `invalid_request`
/// - unknown or expired token → `invalid_token`
/// - storage failure → `server_error`
#[derive(Debug)]
pub struct BearerAuth(pub String);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                AuthError::invalid_request("The \"Authorization\" header is missing.")
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::invalid_request(
                    "The \"Authorization\" header does not carry a bearer token.",
                )
            })?;

        if auth_state.store.validate_access_token(token).await? {
            Ok(Self(token.to_string()))
        } else {
            tracing::debug!("Bearer token rejected");
            Err(AuthError::invalid_token(
                "The access token is unknown or has expired.",
            ))
        }
    }
}
