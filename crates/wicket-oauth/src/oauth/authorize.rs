//! Authorization endpoint types, validation, and redirect encoding.
//!
//! This module provides the typed request for the authorization endpoint,
//! the ordered validation pipeline, the redirect-URI resolver, and the
//! [`RedirectTarget`] encoder that writes response parameters into either
//! the query string (code flow) or the URI fragment (implicit flow).
//!
//! # Error delivery
//!
//! How an authorization error reaches the client depends on whether a
//! redirect target could be established first:
//!
//! ```text
//! GET /authorize?client_id=...&response_type=...&redirect_uri=...
//!     ├─► target not establishable → error returned to the caller
//!     │   (missing client_id, unknown response_type, unusable redirect_uri)
//!     └─► target established → 302 with error in query or fragment
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AuthError;

/// Supported authorization response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// Authorization Code Grant: a short-lived code is delivered via
    /// redirect query and later exchanged for a token.
    Code,
    /// Implicit Grant: the token is delivered directly in the redirect
    /// fragment.
    Token,
}

impl ResponseType {
    /// Parses a `response_type` parameter value.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "code" => Some(Self::Code),
            "token" => Some(Self::Token),
            _ => None,
        }
    }

    /// Returns the wire value of this response type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }

    /// Returns where response parameters are encoded for this flow.
    #[must_use]
    pub fn placement(&self) -> ParamPlacement {
        match self {
            Self::Code => ParamPlacement::Query,
            Self::Token => ParamPlacement::Fragment,
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authorization request parameters, as received on the query string.
///
/// All fields default to empty so that a request with missing parameters
/// still deserializes; validation reports the missing pieces in order.
/// Serializes back to the same query shape, which authenticators that
/// forward the request to another service rely on.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthorizationRequest {
    /// Client identifier issued during registration.
    #[serde(default)]
    pub client_id: String,

    /// Requested response type: "code" or "token".
    #[serde(default)]
    pub response_type: String,

    /// Redirect URI where the response will be sent, exactly as received.
    #[serde(default)]
    pub redirect_uri: String,

    /// Requested scope. Opaque to the engine; recorded with the code and
    /// copied to the token, never interpreted.
    #[serde(default)]
    pub scope: String,

    /// Client-supplied state, echoed back verbatim in every redirect.
    #[serde(default)]
    pub state: String,
}

impl AuthorizationRequest {
    /// Returns the parsed response type, if supported.
    #[must_use]
    pub fn response_type(&self) -> Option<ResponseType> {
        ResponseType::from_param(&self.response_type)
    }
}

/// Validates an authorization request.
///
/// Checks run in a fixed order and the first failure wins; callers must not
/// let later stages (such as redirect resolution) overwrite the returned
/// error.
#[must_use]
pub fn validate_authorization(request: &AuthorizationRequest) -> Option<AuthError> {
    if request.client_id.is_empty() {
        return Some(AuthError::invalid_request(
            "The \"client_id\" parameter is missing.",
        ));
    }
    if request.response_type.is_empty() {
        return Some(AuthError::invalid_request(
            "The \"response_type\" parameter is missing.",
        ));
    }
    if request.response_type().is_none() {
        return Some(AuthError::unsupported_response_type(&request.response_type));
    }
    None
}

/// Resolves the client-supplied redirect URI into a usable target.
///
/// The URI must parse, be absolute, and contain no fragment. A resolution
/// failure is irrecoverable: no redirect may be attempted and the error is
/// returned to the caller for out-of-band rendering.
pub fn resolve_redirect_uri(raw: &str) -> Result<Url, AuthError> {
    if raw.is_empty() {
        return Err(AuthError::invalid_request("Missing redirection URI."));
    }
    let url = Url::parse(raw).map_err(|_| {
        AuthError::invalid_request(format!(
            "The redirection URI is malformed or not absolute: {raw:?}."
        ))
    })?;
    if url.fragment().is_some() {
        return Err(AuthError::invalid_request(format!(
            "The redirection URI must not contain a fragment: {raw:?}."
        )));
    }
    Ok(url)
}

/// Where response parameters are written on the redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPlacement {
    /// Query string (Authorization Code Grant).
    Query,
    /// URI fragment (Implicit Grant).
    Fragment,
}

/// A resolved redirect target plus the parameter placement for the grant
/// in progress.
///
/// Success and error parameters are appended with [`RedirectTarget::append`]
/// and the finished URL extracted with [`RedirectTarget::into_url`]. Empty
/// values are skipped, so an absent `state` or `error_uri` never produces
/// an empty parameter.
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    url: Url,
    placement: ParamPlacement,
    // Fragment parameters are accumulated here and written on `into_url`;
    // resolution guarantees the target starts without a fragment.
    fragment: String,
}

impl RedirectTarget {
    /// Creates a target from a resolved URL and a placement.
    #[must_use]
    pub fn new(url: Url, placement: ParamPlacement) -> Self {
        Self {
            url,
            placement,
            fragment: String::new(),
        }
    }

    /// Appends a parameter, skipping empty values.
    pub fn append(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.placement {
            ParamPlacement::Query => {
                self.url.query_pairs_mut().append_pair(key, value);
            }
            ParamPlacement::Fragment => {
                let mut serializer = url::form_urlencoded::Serializer::new(&mut self.fragment);
                serializer.append_pair(key, value);
            }
        }
    }

    /// Appends the error triple (`error`, `error_description`, `error_uri`).
    pub fn append_error(&mut self, error: &AuthError, error_uri: Option<&str>) {
        self.append("error", error.oauth_error_code());
        self.append("error_description", error.description());
        self.append("error_uri", error_uri.unwrap_or(""));
    }

    /// Finishes the target and returns the redirect URL.
    #[must_use]
    pub fn into_url(mut self) -> Url {
        if !self.fragment.is_empty() {
            self.url.set_fragment(Some(&self.fragment));
        }
        self.url
    }
}
