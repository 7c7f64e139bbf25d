//! Code and token lifecycle over pluggable storage collaborators.
//!
//! [`TokenStore`] mediates every create/lookup of authorization codes and
//! access tokens. The actual persistence is behind the [`AuthCache`] trait;
//! client validity checks are behind [`ClientStore`]. A bundled in-memory
//! backend lives in the `wicket-cache-memory` crate.
//!
//! # Implementation notes for backends
//!
//! - `take_code` must be atomic (remove-and-return) so a code can never be
//!   exchanged twice, even by concurrent requests.
//! - Entries carry a TTL; backends may expire lazily, but an expired entry
//!   must never be returned.
//! - Never log code or token values.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::secret::generate_secret;
use crate::types::Client;

/// Token type issued by this engine.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Error from a storage collaborator.
///
/// Backends report failures as opaque messages; the store wraps them as
/// `server_error` before they propagate.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CacheError(pub String);

impl CacheError {
    /// Creates a new cache error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<CacheError> for AuthError {
    fn from(err: CacheError) -> Self {
        AuthError::storage(err.0)
    }
}

/// Data registered with an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    /// Client the code was issued to.
    pub client_id: String,
    /// Scope requested at authorization time (opaque).
    pub scope: String,
    /// Redirect URI presented at authorization time; must match at exchange.
    pub redirect_uri: String,
}

/// Data registered with an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    /// Client the token was issued to.
    pub client_id: String,
    /// Scope carried over from the authorization (opaque).
    pub scope: String,
}

/// Storage collaborator for codes and tokens with TTL semantics.
#[async_trait]
pub trait AuthCache: Send + Sync {
    /// Registers an authorization code with a TTL.
    async fn register_code(
        &self,
        code: &str,
        entry: CodeEntry,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Registers an access token with a TTL. A zero TTL means the token
    /// never expires.
    async fn register_token(
        &self,
        token: &str,
        entry: TokenEntry,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Atomically removes and returns a code entry.
    ///
    /// Returns `None` for unknown or expired codes. Because the entry is
    /// removed on first observation, a code can be taken at most once.
    async fn take_code(&self, code: &str) -> Result<Option<CodeEntry>, CacheError>;

    /// Returns whether a token is registered and unexpired. Pure lookup,
    /// no mutation of the entry.
    async fn lookup_token(&self, token: &str) -> Result<bool, CacheError>;
}

/// Client-validity collaborator.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Looks up a client registration by id.
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, CacheError>;
}

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The opaque bearer token.
    pub token: String,
    /// Always [`TOKEN_TYPE_BEARER`].
    pub token_type: String,
    /// Lifetime in seconds; zero means non-expiring.
    pub expires_in: u64,
}

/// Mediates authorization-code and access-token lifecycle against the
/// storage collaborators.
pub struct TokenStore {
    cache: Arc<dyn AuthCache>,
    clients: Arc<dyn ClientStore>,
    config: OAuthConfig,
}

impl TokenStore {
    /// Creates a new store over the given collaborators.
    pub fn new(
        cache: Arc<dyn AuthCache>,
        clients: Arc<dyn ClientStore>,
        config: OAuthConfig,
    ) -> Self {
        Self {
            cache,
            clients,
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Looks up a client, failing with `unauthorized_client` when the id is
    /// not registered.
    pub async fn get_client(&self, client_id: &str) -> Result<Client, AuthError> {
        match self.clients.find_client(client_id).await? {
            Some(client) => Ok(client),
            None => {
                tracing::warn!(client_id = %client_id, "Unknown client");
                Err(AuthError::unauthorized_client("ClientID not valid."))
            }
        }
    }

    /// Creates and registers a fresh authorization code.
    pub async fn create_authorization_code(
        &self,
        client_id: &str,
        scope: &str,
        redirect_uri: &str,
    ) -> Result<String, AuthError> {
        let code = generate_secret();
        let entry = CodeEntry {
            client_id: client_id.to_string(),
            scope: scope.to_string(),
            redirect_uri: redirect_uri.to_string(),
        };
        self.cache
            .register_code(&code, entry, self.config.authorization_code_lifetime)
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client_id, error = %e, "Failed to register authorization code");
                AuthError::from(e)
            })?;
        tracing::debug!(client_id = %client_id, "Authorization code issued");
        Ok(code)
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// The code is consumed on first observation, so a replayed exchange
    /// fails with `invalid_grant` even inside the TTL window. The redirect
    /// URI presented now must be byte-identical to the one recorded at
    /// issuance.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<IssuedToken, AuthError> {
        let entry = self
            .cache
            .take_code(code)
            .await?
            .ok_or_else(|| {
                AuthError::invalid_grant("The authorization code is unknown or has expired.")
            })?;

        if entry.redirect_uri != redirect_uri {
            tracing::warn!(client_id = %entry.client_id, "Redirect URI mismatch at code exchange");
            return Err(AuthError::bad_redirect_uri("Redirect URI incorrect."));
        }

        self.issue_token(&entry.client_id, &entry.scope).await
    }

    /// Issues an access token directly, without a code round-trip.
    pub async fn create_implicit_access_token(
        &self,
        client_id: &str,
        scope: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.issue_token(client_id, scope).await
    }

    /// Returns whether a bearer token is registered and unexpired.
    pub async fn validate_access_token(&self, bearer: &str) -> Result<bool, AuthError> {
        Ok(self.cache.lookup_token(bearer).await?)
    }

    async fn issue_token(&self, client_id: &str, scope: &str) -> Result<IssuedToken, AuthError> {
        let token = generate_secret();
        let entry = TokenEntry {
            client_id: client_id.to_string(),
            scope: scope.to_string(),
        };
        let ttl = self.config.access_token_lifetime;
        self.cache
            .register_token(&token, entry, ttl)
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client_id, error = %e, "Failed to register access token");
                AuthError::from(e)
            })?;
        tracing::debug!(client_id = %client_id, "Access token issued");
        Ok(IssuedToken {
            token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: ttl.as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Client;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    // Minimal backend for store-level tests; the production backend lives
    // in the wicket-cache-memory crate.
    #[derive(Default)]
    struct TestCache {
        codes: Mutex<HashMap<String, (CodeEntry, OffsetDateTime)>>,
        tokens: Mutex<HashMap<String, (TokenEntry, Option<OffsetDateTime>)>>,
        fail: bool,
    }

    impl TestCache {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), CacheError> {
            if self.fail {
                Err(CacheError::new("backend unavailable"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl AuthCache for TestCache {
        async fn register_code(
            &self,
            code: &str,
            entry: CodeEntry,
            ttl: Duration,
        ) -> Result<(), CacheError> {
            self.check()?;
            let expires_at = OffsetDateTime::now_utc() + ttl;
            self.codes
                .lock()
                .unwrap()
                .insert(code.to_string(), (entry, expires_at));
            Ok(())
        }

        async fn register_token(
            &self,
            token: &str,
            entry: TokenEntry,
            ttl: Duration,
        ) -> Result<(), CacheError> {
            self.check()?;
            let expires_at = if ttl.is_zero() {
                None
            } else {
                Some(OffsetDateTime::now_utc() + ttl)
            };
            self.tokens
                .lock()
                .unwrap()
                .insert(token.to_string(), (entry, expires_at));
            Ok(())
        }

        async fn take_code(&self, code: &str) -> Result<Option<CodeEntry>, CacheError> {
            self.check()?;
            let removed = self.codes.lock().unwrap().remove(code);
            Ok(removed.and_then(|(entry, expires_at)| {
                (OffsetDateTime::now_utc() < expires_at).then_some(entry)
            }))
        }

        async fn lookup_token(&self, token: &str) -> Result<bool, CacheError> {
            self.check()?;
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .get(token)
                .is_some_and(|(_, expires_at)| {
                    expires_at.is_none_or(|at| OffsetDateTime::now_utc() < at)
                }))
        }
    }

    struct SingleClient(Client);

    #[async_trait]
    impl ClientStore for SingleClient {
        async fn find_client(&self, client_id: &str) -> Result<Option<Client>, CacheError> {
            Ok((self.0.client_id == client_id).then(|| self.0.clone()))
        }
    }

    fn store_with(cache: TestCache, config: OAuthConfig) -> TokenStore {
        let client = Client::public("client1", "https://cb.example/");
        TokenStore::new(Arc::new(cache), Arc::new(SingleClient(client)), config)
    }

    fn store() -> TokenStore {
        store_with(TestCache::default(), OAuthConfig::default())
    }

    #[tokio::test]
    async fn test_code_round_trip() {
        let store = store();
        let code = store
            .create_authorization_code("client1", "read", "https://cb.example/")
            .await
            .unwrap();
        assert!(!code.is_empty());

        let issued = store
            .exchange_code(&code, "https://cb.example/")
            .await
            .unwrap();
        assert_eq!(issued.token_type, TOKEN_TYPE_BEARER);
        assert_eq!(issued.expires_in, 3600);
        assert!(store.validate_access_token(&issued.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let store = store();
        let code = store
            .create_authorization_code("client1", "", "https://cb.example/")
            .await
            .unwrap();

        store
            .exchange_code(&code, "https://cb.example/")
            .await
            .unwrap();
        let err = store
            .exchange_code(&code, "https://cb.example/")
            .await
            .unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_redirect_uri_mismatch() {
        let store = store();
        let code = store
            .create_authorization_code("client1", "", "https://cb.example/")
            .await
            .unwrap();

        let err = store
            .exchange_code(&code, "https://other.example/")
            .await
            .unwrap_err();
        assert_eq!(err.oauth_error_code(), "bad_redirect_uri");
    }

    #[tokio::test]
    async fn test_expired_code_is_invalid_grant() {
        let config = OAuthConfig {
            authorization_code_lifetime: Duration::ZERO,
            ..OAuthConfig::default()
        };
        let store = store_with(TestCache::default(), config);
        let code = store
            .create_authorization_code("client1", "", "https://cb.example/")
            .await
            .unwrap();

        let err = store
            .exchange_code(&code, "https://cb.example/")
            .await
            .unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let err = store()
            .exchange_code("nope", "https://cb.example/")
            .await
            .unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_implicit_token() {
        let store = store();
        let issued = store
            .create_implicit_access_token("client1", "read")
            .await
            .unwrap();
        assert!(store.validate_access_token(&issued.token).await.unwrap());
        assert!(!store.validate_access_token("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_backend_failure_is_server_error() {
        let store = store_with(TestCache::failing(), OAuthConfig::default());
        let err = store
            .create_authorization_code("client1", "", "https://cb.example/")
            .await
            .unwrap_err();
        assert_eq!(err.oauth_error_code(), "server_error");
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_get_client() {
        let store = store();
        let client = store.get_client("client1").await.unwrap();
        assert_eq!(client.client_id, "client1");

        let err = store.get_client("ghost").await.unwrap_err();
        assert_eq!(err.oauth_error_code(), "unauthorized_client");
    }
}
