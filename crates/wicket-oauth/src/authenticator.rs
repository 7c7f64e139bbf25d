//! Ready-made [`Authenticator`] implementations.
//!
//! Real deployments implement [`Authenticator`] themselves to drive a login
//! or consent experience. Two implementations ship with the engine:
//! [`ApprovalList`] decides from a fixed client list without user
//! interaction, and [`Redirecter`] forwards the authorization request to an
//! external login service.

use std::collections::HashSet;

use async_trait::async_trait;
use axum::response::{IntoResponse, Redirect, Response};
use url::Url;

use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationRequest;
use crate::oauth::flow::{Authenticator, CodeFlow, ImplicitFlow};

/// Authenticator that decides from fixed client-id lists.
///
/// Carries a default policy plus per-client exceptions: deny-by-default
/// with [`ApprovalList::approve`] entries, or allow-by-default (via
/// [`ApprovalList::allow_by_default`]) with [`ApprovalList::deny`] entries.
/// An explicit deny always wins. Rejected clients get `access_denied`.
/// Decisions need no user interaction, so flows complete in a single round
/// trip.
#[derive(Debug, Default, Clone)]
pub struct ApprovalList {
    approved: HashSet<String>,
    denied: HashSet<String>,
    default_allow: bool,
}

impl ApprovalList {
    /// Creates a deny-by-default list; until clients are approved,
    /// everything is denied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allow-by-default list; every client is approved unless
    /// explicitly denied.
    #[must_use]
    pub fn allow_by_default() -> Self {
        Self {
            default_allow: true,
            ..Self::default()
        }
    }

    /// Adds a client id to the approved set.
    #[must_use]
    pub fn approve(mut self, client_id: impl Into<String>) -> Self {
        self.approved.insert(client_id.into());
        self
    }

    /// Adds a client id to the denied set. Denials override approvals and
    /// the default policy.
    #[must_use]
    pub fn deny(mut self, client_id: impl Into<String>) -> Self {
        self.denied.insert(client_id.into());
        self
    }

    fn decide(&self, client_id: &str) -> Result<(), AuthError> {
        let allowed = if self.denied.contains(client_id) {
            false
        } else {
            self.default_allow || self.approved.contains(client_id)
        };
        if allowed {
            Ok(())
        } else {
            tracing::debug!(client_id = %client_id, "Client rejected by approval list");
            Err(AuthError::access_denied("access denied"))
        }
    }
}

#[async_trait]
impl Authenticator for ApprovalList {
    async fn authorize_code(&self, _request: &AuthorizationRequest, flow: CodeFlow) -> Response {
        let decision = self.decide(flow.client_id());
        flow.finish(decision).await
    }

    async fn authorize_implicit(
        &self,
        _request: &AuthorizationRequest,
        flow: ImplicitFlow,
    ) -> Response {
        let decision = self.decide(flow.client_id());
        flow.finish(decision).await
    }
}

/// Authenticator that forwards the request to an external login service.
///
/// Answers every authorization request with a 303 to the configured URL
/// for the flow in question, carrying the original query parameters so the
/// login service can resume the flow once the resource owner is
/// authenticated. The flow value is dropped here; completion happens from
/// a later request.
#[derive(Debug, Clone)]
pub struct Redirecter {
    auth_code: Url,
    implicit: Url,
}

impl Redirecter {
    /// Creates a redirecter with per-flow login URLs.
    pub fn new(auth_code_url: &str, implicit_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            auth_code: Url::parse(auth_code_url)?,
            implicit: Url::parse(implicit_url)?,
        })
    }

    fn forward(&self, base: &Url, request: &AuthorizationRequest) -> Response {
        let mut target = base.clone();
        // All fields are plain strings; serialization cannot fail.
        let query = serde_urlencoded::to_string(request).unwrap_or_default();
        target.set_query(Some(&query));
        Redirect::to(target.as_str()).into_response()
    }
}

#[async_trait]
impl Authenticator for Redirecter {
    async fn authorize_code(&self, request: &AuthorizationRequest, _flow: CodeFlow) -> Response {
        self.forward(&self.auth_code, request)
    }

    async fn authorize_implicit(
        &self,
        request: &AuthorizationRequest,
        _flow: ImplicitFlow,
    ) -> Response {
        self.forward(&self.implicit, request)
    }
}
