//! Authorization-server error types.
//!
//! This module defines the error taxonomy used across the engine. Every
//! error maps to an OAuth 2.0 wire code via [`AuthError::oauth_error_code`];
//! where the error ends up (redirect parameters, JSON body, or the caller's
//! own error page) is decided by the dispatcher, not here.

use std::fmt;

/// Errors produced while processing authorization, token-exchange, or
/// bearer-verification requests.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The request is missing a required parameter, includes an invalid
    /// parameter value, or carries an unusable redirection URI.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The authorization server does not support the requested response type.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The client was rejected by the client-validity collaborator.
    #[error("Unauthorized client: {message}")]
    UnauthorizedClient {
        /// Description of why the client is unauthorized.
        message: String,
    },

    /// The resource owner or authentication collaborator denied the request.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The redirection URI presented at code exchange does not match the one
    /// recorded when the code was issued.
    #[error("Bad redirect URI: {message}")]
    BadRedirectUri {
        /// Description of the mismatch.
        message: String,
    },

    /// The authorization code is unknown, expired, or already consumed.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The bearer token is absent, unknown, or expired.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// An error occurred in the storage backend.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(message: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `BadRedirectUri` error.
    #[must_use]
    pub fn bad_redirect_uri(message: impl Into<String>) -> Self {
        Self::BadRedirectUri {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::AccessDenied { .. } => "access_denied",
            Self::BadRedirectUri { .. } => "bad_redirect_uri",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::InvalidToken { .. } => "invalid_token",
            Self::Storage { .. } => "server_error",
        }
    }

    /// Returns the human-readable description carried by this error.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::InvalidRequest { message }
            | Self::UnauthorizedClient { message }
            | Self::AccessDenied { message }
            | Self::BadRedirectUri { message }
            | Self::InvalidGrant { message }
            | Self::InvalidToken { message }
            | Self::Storage { message } => message,
            Self::UnsupportedResponseType { response_type } => response_type,
            Self::UnsupportedGrantType { grant_type } => grant_type,
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Categories of errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request validation errors.
    Validation,
    /// Authorization decisions (denied access, rejected client).
    Authorization,
    /// Grant and token lifecycle errors.
    Grant,
    /// Storage backend errors.
    Infrastructure,
}

impl AuthError {
    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. }
            | Self::UnsupportedResponseType { .. }
            | Self::UnsupportedGrantType { .. } => ErrorCategory::Validation,
            Self::UnauthorizedClient { .. } | Self::AccessDenied { .. } => {
                ErrorCategory::Authorization
            }
            Self::BadRedirectUri { .. } | Self::InvalidGrant { .. } | Self::InvalidToken { .. } => {
                ErrorCategory::Grant
            }
            Self::Storage { .. } => ErrorCategory::Infrastructure,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Authorization => write!(f, "authorization"),
            Self::Grant => write!(f, "grant"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}
