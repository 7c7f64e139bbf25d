//! Grant dispatch and the authentication continuation.
//!
//! [`AuthorizationEngine::authorize`] runs the validation pipeline, resolves
//! the redirect target, checks the client, and then hands control to the
//! embedding application's [`Authenticator`]. The authenticator owns the
//! user-facing part of the flow (login page, consent screen, whatever the
//! application needs) and reports its decision through the flow value it was
//! given. Calling [`CodeFlow::finish`] or [`ImplicitFlow::finish`] consumes
//! the flow, so a decision can be delivered at most once.
//!
//! ```text
//! /authorize ──► validate ──► resolve redirect ──► check client
//!                   │                │                  │
//!                   └── ErrorPage ◄──┴──────────────────┘
//!                                                       │
//!                            Authenticator::authorize_* ▼
//!                 flow.finish(Ok(()))  → 302 with code / token
//!                 flow.finish(Err(e))  → 302 with error triple
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::error::AuthError;
use crate::oauth::authorize::{
    resolve_redirect_uri, validate_authorization, AuthorizationRequest, RedirectTarget,
    ResponseType,
};
use crate::store::TokenStore;

/// Application-supplied authentication and consent collaborator.
///
/// The engine calls exactly one of these methods per authorization request,
/// matching the requested grant. Implementations decide however they like
/// (render a login page, consult a session, check an allow list) and then
/// call `finish` on the flow they received. The returned response is served
/// to the user agent as-is, so an implementation may also return an
/// intermediate page and complete the flow from a later request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Handles an Authorization Code Grant request.
    async fn authorize_code(&self, request: &AuthorizationRequest, flow: CodeFlow) -> Response;

    /// Handles an Implicit Grant request.
    async fn authorize_implicit(
        &self,
        request: &AuthorizationRequest,
        flow: ImplicitFlow,
    ) -> Response;
}

/// Outcome of dispatching an authorization request.
#[derive(Debug)]
pub enum AuthorizeOutcome {
    /// No redirect target could be established (or using it would be
    /// unsafe). The caller renders the error itself; no redirect happens.
    ErrorPage(AuthError),
    /// A target was established but the request failed before reaching the
    /// authenticator. The error triple is already encoded in the redirect.
    ErrorRedirect(Response),
    /// The request was handed to the authenticator; this is its response.
    Pending(Response),
}

/// In-progress Authorization Code Grant, handed to the [`Authenticator`].
pub struct CodeFlow {
    store: Arc<TokenStore>,
    target: RedirectTarget,
    client_id: String,
    scope: String,
    redirect_uri: String,
    state: String,
}

impl CodeFlow {
    /// The client requesting authorization.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The requested scope, opaque to the engine.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Completes the flow with the authenticator's decision.
    ///
    /// On approval a fresh authorization code is registered and delivered in
    /// the redirect query together with the echoed `state`. On denial (or a
    /// storage failure) the error triple is delivered the same way.
    pub async fn finish(mut self, decision: Result<(), AuthError>) -> Response {
        let issued = match decision {
            Ok(()) => {
                self.store
                    .create_authorization_code(&self.client_id, &self.scope, &self.redirect_uri)
                    .await
            }
            Err(err) => Err(err),
        };
        match issued {
            Ok(code) => {
                self.target.append("code", &code);
                self.target.append("state", &self.state);
                redirect_found(self.target.into_url())
            }
            Err(err) => error_redirect(self.store.config(), self.target, &err, &self.state),
        }
    }
}

/// In-progress Implicit Grant, handed to the [`Authenticator`].
pub struct ImplicitFlow {
    store: Arc<TokenStore>,
    target: RedirectTarget,
    client_id: String,
    scope: String,
    state: String,
}

impl ImplicitFlow {
    /// The client requesting authorization.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The requested scope, opaque to the engine.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Completes the flow with the authenticator's decision.
    ///
    /// On approval an access token is issued and delivered in the redirect
    /// fragment with `token_type`, `expires_in` (when the token expires),
    /// and the echoed `state`. Errors are delivered in the fragment too.
    pub async fn finish(mut self, decision: Result<(), AuthError>) -> Response {
        let issued = match decision {
            Ok(()) => {
                self.store
                    .create_implicit_access_token(&self.client_id, &self.scope)
                    .await
            }
            Err(err) => Err(err),
        };
        match issued {
            Ok(token) => {
                self.target.append("token", &token.token);
                self.target.append("token_type", &token.token_type);
                if token.expires_in > 0 {
                    self.target
                        .append("expires_in", &token.expires_in.to_string());
                }
                self.target.append("state", &self.state);
                redirect_found(self.target.into_url())
            }
            Err(err) => error_redirect(self.store.config(), self.target, &err, &self.state),
        }
    }
}

/// Dispatches authorization requests to the configured [`Authenticator`].
pub struct AuthorizationEngine {
    store: Arc<TokenStore>,
    authenticator: Arc<dyn Authenticator>,
}

impl AuthorizationEngine {
    /// Creates an engine over a token store and an authenticator.
    pub fn new(store: Arc<TokenStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    /// Returns the underlying token store.
    #[must_use]
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Processes an authorization request.
    ///
    /// Validation failures and unusable redirect URIs never redirect: those
    /// come back as [`AuthorizeOutcome::ErrorPage`] for the caller to
    /// render. A redirect mismatch against the client registration is
    /// treated the same way, since redirecting to an unverified URI would
    /// hand out an open redirect.
    pub async fn authorize(&self, request: &AuthorizationRequest) -> AuthorizeOutcome {
        if let Some(err) = validate_authorization(request) {
            tracing::debug!(
                client_id = %request.client_id,
                error = %err.oauth_error_code(),
                "Authorization request rejected"
            );
            return AuthorizeOutcome::ErrorPage(err);
        }
        // validate_authorization guarantees a supported response type.
        let Some(response_type) = request.response_type() else {
            return AuthorizeOutcome::ErrorPage(AuthError::unsupported_response_type(
                &request.response_type,
            ));
        };

        let url = match resolve_redirect_uri(&request.redirect_uri) {
            Ok(url) => url,
            Err(err) => return AuthorizeOutcome::ErrorPage(err),
        };
        let target = RedirectTarget::new(url, response_type.placement());

        let client = match self.store.get_client(&request.client_id).await {
            Ok(client) => client,
            Err(err) if err.is_server_error() => {
                // The target is established, so infrastructure failures are
                // reported through it.
                return AuthorizeOutcome::ErrorRedirect(error_redirect(
                    self.store.config(),
                    target,
                    &err,
                    &request.state,
                ));
            }
            Err(err) => return AuthorizeOutcome::ErrorPage(err),
        };

        if !client.validate_redirect_uri(&request.redirect_uri) {
            tracing::warn!(
                client_id = %request.client_id,
                "Redirect URI does not match client registration"
            );
            return AuthorizeOutcome::ErrorPage(AuthError::invalid_request(
                "The redirection URI does not match the client registration.",
            ));
        }

        let response = match response_type {
            ResponseType::Code => {
                let flow = CodeFlow {
                    store: Arc::clone(&self.store),
                    target,
                    client_id: request.client_id.clone(),
                    scope: request.scope.clone(),
                    redirect_uri: request.redirect_uri.clone(),
                    state: request.state.clone(),
                };
                self.authenticator.authorize_code(request, flow).await
            }
            ResponseType::Token => {
                let flow = ImplicitFlow {
                    store: Arc::clone(&self.store),
                    target,
                    client_id: request.client_id.clone(),
                    scope: request.scope.clone(),
                    state: request.state.clone(),
                };
                self.authenticator.authorize_implicit(request, flow).await
            }
        };
        AuthorizeOutcome::Pending(response)
    }
}

fn error_redirect(
    config: &crate::config::OAuthConfig,
    mut target: RedirectTarget,
    error: &AuthError,
    state: &str,
) -> Response {
    tracing::debug!(
        error = %error.oauth_error_code(),
        category = %error.category(),
        "Delivering authorization error via redirect"
    );
    target.append_error(error, config.error_uri(error.oauth_error_code()));
    target.append("state", state);
    redirect_found(target.into_url())
}

// 302 Found, the status user agents and OAuth clients expect here.
// axum's Redirect helpers produce 303/307/308 only.
fn redirect_found(url: Url) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, url.as_str())
        .body(axum::body::Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;
    use crate::store::{AuthCache, CacheError, ClientStore, CodeEntry, TokenEntry};
    use crate::types::Client;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MapCache {
        codes: Mutex<HashMap<String, CodeEntry>>,
        tokens: Mutex<HashMap<String, TokenEntry>>,
    }

    #[async_trait]
    impl AuthCache for MapCache {
        async fn register_code(
            &self,
            code: &str,
            entry: CodeEntry,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            self.codes.lock().unwrap().insert(code.to_string(), entry);
            Ok(())
        }

        async fn register_token(
            &self,
            token: &str,
            entry: TokenEntry,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            self.tokens.lock().unwrap().insert(token.to_string(), entry);
            Ok(())
        }

        async fn take_code(&self, code: &str) -> Result<Option<CodeEntry>, CacheError> {
            Ok(self.codes.lock().unwrap().remove(code))
        }

        async fn lookup_token(&self, token: &str) -> Result<bool, CacheError> {
            Ok(self.tokens.lock().unwrap().contains_key(token))
        }
    }

    struct Clients(Vec<Client>);

    #[async_trait]
    impl ClientStore for Clients {
        async fn find_client(&self, client_id: &str) -> Result<Option<Client>, CacheError> {
            Ok(self.0.iter().find(|c| c.client_id == client_id).cloned())
        }
    }

    struct BrokenClients;

    #[async_trait]
    impl ClientStore for BrokenClients {
        async fn find_client(&self, _client_id: &str) -> Result<Option<Client>, CacheError> {
            Err(CacheError::new("backend unavailable"))
        }
    }

    /// Approves everything, denying only client "denied".
    struct TestAuthenticator;

    #[async_trait]
    impl Authenticator for TestAuthenticator {
        async fn authorize_code(&self, _request: &AuthorizationRequest, flow: CodeFlow) -> Response {
            let decision = if flow.client_id() == "denied" {
                Err(AuthError::access_denied("access denied"))
            } else {
                Ok(())
            };
            flow.finish(decision).await
        }

        async fn authorize_implicit(
            &self,
            _request: &AuthorizationRequest,
            flow: ImplicitFlow,
        ) -> Response {
            let decision = if flow.client_id() == "denied" {
                Err(AuthError::access_denied("access denied"))
            } else {
                Ok(())
            };
            flow.finish(decision).await
        }
    }

    fn engine_with(clients: Arc<dyn ClientStore>, config: OAuthConfig) -> AuthorizationEngine {
        let store = Arc::new(TokenStore::new(Arc::new(MapCache::default()), clients, config));
        AuthorizationEngine::new(store, Arc::new(TestAuthenticator))
    }

    fn engine() -> AuthorizationEngine {
        let clients = Arc::new(Clients(vec![
            Client::public("client1", "https://cb.example/"),
            Client::public("denied", ""),
        ]));
        engine_with(clients, OAuthConfig::default())
    }

    fn request(client_id: &str, response_type: &str, redirect_uri: &str) -> AuthorizationRequest {
        AuthorizationRequest {
            client_id: client_id.to_string(),
            response_type: response_type.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scope: "read".to_string(),
            state: "s1".to_string(),
        }
    }

    fn location(response: &Response) -> Url {
        let raw = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        Url::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_missing_client_id_is_error_page() {
        let outcome = engine()
            .authorize(&request("", "code", "https://cb.example/"))
            .await;
        match outcome {
            AuthorizeOutcome::ErrorPage(err) => {
                assert_eq!(err.oauth_error_code(), "invalid_request");
                assert!(err.description().contains("client_id"));
            }
            other => panic!("expected error page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_response_type_is_error_page() {
        let outcome = engine()
            .authorize(&request("client1", "blah", "https://cb.example/"))
            .await;
        match outcome {
            AuthorizeOutcome::ErrorPage(err) => {
                assert_eq!(err.oauth_error_code(), "unsupported_response_type");
            }
            other => panic!("expected error page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unusable_redirect_is_error_page() {
        let outcome = engine().authorize(&request("client1", "code", "/rel")).await;
        assert!(matches!(outcome, AuthorizeOutcome::ErrorPage(_)));
    }

    #[tokio::test]
    async fn test_unknown_client_is_error_page() {
        let outcome = engine()
            .authorize(&request("ghost", "code", "https://cb.example/"))
            .await;
        match outcome {
            AuthorizeOutcome::ErrorPage(err) => {
                assert_eq!(err.oauth_error_code(), "unauthorized_client");
            }
            other => panic!("expected error page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registration_mismatch_is_error_page() {
        let outcome = engine()
            .authorize(&request("client1", "code", "https://evil.example/"))
            .await;
        match outcome {
            AuthorizeOutcome::ErrorPage(err) => {
                assert_eq!(err.oauth_error_code(), "invalid_request");
                assert!(err.description().contains("registration"));
            }
            other => panic!("expected error page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_code_flow_redirects_with_code_and_state() {
        let outcome = engine()
            .authorize(&request("client1", "code", "https://cb.example/"))
            .await;
        let AuthorizeOutcome::Pending(response) = outcome else {
            panic!("expected pending response");
        };
        assert_eq!(response.status(), StatusCode::FOUND);
        let url = location(&response);
        let query = url.query().unwrap();
        assert!(query.contains("code="));
        assert!(query.contains("state=s1"));
        assert!(url.fragment().is_none());
    }

    #[tokio::test]
    async fn test_implicit_flow_redirects_with_fragment_token() {
        let outcome = engine()
            .authorize(&request("client1", "token", "https://cb.example/"))
            .await;
        let AuthorizeOutcome::Pending(response) = outcome else {
            panic!("expected pending response");
        };
        assert_eq!(response.status(), StatusCode::FOUND);
        let url = location(&response);
        let fragment = url.fragment().unwrap();
        assert!(fragment.contains("token="));
        assert!(fragment.contains("token_type=bearer"));
        assert!(fragment.contains("expires_in=3600"));
        assert!(fragment.contains("state=s1"));
        assert!(url.query().is_none());
    }

    #[tokio::test]
    async fn test_denied_code_flow_redirects_with_error() {
        let outcome = engine()
            .authorize(&request("denied", "code", "https://cb.example/"))
            .await;
        let AuthorizeOutcome::Pending(response) = outcome else {
            panic!("expected pending response");
        };
        let url = location(&response);
        let query = url.query().unwrap();
        assert!(query.contains("error=access_denied"));
        assert!(query.contains("state=s1"));
        assert!(!query.contains("code="));
    }

    #[tokio::test]
    async fn test_denied_implicit_flow_errors_in_fragment() {
        let outcome = engine()
            .authorize(&request("denied", "token", "https://cb.example/"))
            .await;
        let AuthorizeOutcome::Pending(response) = outcome else {
            panic!("expected pending response");
        };
        let url = location(&response);
        let fragment = url.fragment().unwrap();
        assert!(fragment.contains("error=access_denied"));
        assert!(!fragment.contains("token="));
    }

    #[tokio::test]
    async fn test_client_store_failure_redirects_server_error() {
        let engine = engine_with(Arc::new(BrokenClients), OAuthConfig::default());
        let outcome = engine
            .authorize(&request("client1", "code", "https://cb.example/"))
            .await;
        let AuthorizeOutcome::ErrorRedirect(response) = outcome else {
            panic!("expected error redirect");
        };
        let url = location(&response);
        assert!(url.query().unwrap().contains("error=server_error"));
    }

    #[tokio::test]
    async fn test_registered_error_uri_reaches_redirect() {
        let clients = Arc::new(Clients(vec![Client::public("denied", "")]));
        let config = OAuthConfig::default()
            .with_error_uri("access_denied", "https://auth.example.com/denied");
        let engine = engine_with(clients, config);
        let outcome = engine
            .authorize(&request("denied", "code", "https://cb.example/"))
            .await;
        let AuthorizeOutcome::Pending(response) = outcome else {
            panic!("expected pending response");
        };
        let url = location(&response);
        assert!(url.query().unwrap().contains("error_uri="));
    }
}
