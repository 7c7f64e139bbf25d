//! Token endpoint types and validation.
//!
//! The token endpoint accepts exactly one grant type in this profile,
//! `authorization_code`, and returns either the issued token or the error
//! triple as a JSON body.
//!
//! # Example
//!
//! ```ignore
//! GET /token?grant_type=authorization_code
//!     &code=iFqhTVP2hFlBMkDBlCqbrlr-deGrGpZXkdkpMEqWt9E
//!     &redirect_uri=https://app.example.com/callback
//! ```

use serde::Serialize;

use crate::error::AuthError;

/// Token-exchange request parameters, as received on the query string.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TokenExchangeRequest {
    /// OAuth 2.0 grant type. Must be "authorization_code".
    #[serde(default)]
    pub grant_type: String,

    /// The authorization code being exchanged.
    #[serde(default)]
    pub code: String,

    /// Redirect URI; must match the one presented when the code was issued.
    #[serde(default)]
    pub redirect_uri: String,
}

/// Validates a token-exchange request.
///
/// Checks run in a fixed order, first failure wins: missing `grant_type`,
/// missing `code`, missing `redirect_uri`, then unsupported `grant_type`.
#[must_use]
pub fn validate_token_exchange(request: &TokenExchangeRequest) -> Option<AuthError> {
    if request.grant_type.is_empty() {
        return Some(AuthError::invalid_request(
            "The \"grant_type\" parameter is missing.",
        ));
    }
    if request.code.is_empty() {
        return Some(AuthError::invalid_request(
            "The \"code\" parameter is missing.",
        ));
    }
    if request.redirect_uri.is_empty() {
        return Some(AuthError::invalid_request(
            "The \"redirect_uri\" parameter is missing.",
        ));
    }
    if request.grant_type != "authorization_code" {
        return Some(AuthError::unsupported_grant_type(&request.grant_type));
    }
    None
}

/// Successful token response body.
///
/// ```json
/// {
///   "token": "iFqhTVP2hFlBMkDBlCqbrlr-deGrGpZXkdkpMEqWt9E",
///   "token_type": "bearer",
///   "expires_in": 3600
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// The issued bearer token.
    pub token: String,

    /// Token type, always "bearer".
    pub token_type: String,

    /// Token lifetime in seconds; omitted when zero (non-expiring).
    #[serde(skip_serializing_if = "expiry_is_zero")]
    pub expires_in: u64,
}

fn expiry_is_zero(expires_in: &u64) -> bool {
    *expires_in == 0
}

/// Error response body for the token endpoint and bearer-verification
/// failures.
///
/// Only the structured code, description, and registered URI are exposed;
/// internal diagnostic text never reaches the body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// OAuth 2.0 error code.
    pub error: &'static str,

    /// Human-readable error description.
    pub error_description: String,

    /// Documentation URI registered for this error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl ErrorBody {
    /// Builds the error body for an engine error.
    #[must_use]
    pub fn from_error(error: &AuthError, error_uri: Option<&str>) -> Self {
        Self {
            error: error.oauth_error_code(),
            error_description: error.description().to_string(),
            error_uri: error_uri.map(str::to_string),
        }
    }
}
