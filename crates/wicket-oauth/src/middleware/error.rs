//! Error response handling for the bearer extractor.
//!
//! Implements `IntoResponse` for `AuthError` so the extractor can reject
//! requests directly. Every rejection is a 401 with a `WWW-Authenticate`
//! challenge. Only the structured error triple reaches the body;
//! verification failures never leak internal diagnostics beyond the
//! registered description.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::AuthError;
use crate::oauth::token::ErrorBody;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from_error(&self, None);

        let mut headers = HeaderMap::new();
        let www_auth = build_www_authenticate_header(body.error, &body.error_description);
        if let Ok(value) = HeaderValue::from_str(&www_auth) {
            headers.insert(header::WWW_AUTHENTICATE, value);
        }

        (StatusCode::UNAUTHORIZED, headers, Json(body)).into_response()
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!("Bearer error=\"{error}\", error_description=\"{escaped_desc}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_invalid_token_response() {
        let error = AuthError::invalid_token("The access token is unknown or has expired.");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.starts_with("Bearer "));
        assert!(www_auth.contains("error=\"invalid_token\""));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "invalid_token");
        assert!(json["error_description"]
            .as_str()
            .unwrap()
            .contains("expired"));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let error = AuthError::invalid_request("The \"Authorization\" header is missing.");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.contains("error=\"invalid_request\""));
    }

    #[tokio::test]
    async fn test_storage_error_is_masked_server_error() {
        let error = AuthError::storage("backend unavailable");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "server_error");
    }

    #[test]
    fn test_www_authenticate_header_escaping() {
        let header = build_www_authenticate_header("invalid_token", "a \"quoted\" reason");
        assert!(header.contains("\\\"quoted\\\""));
    }
}
