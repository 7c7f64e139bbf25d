//! # wicket-oauth
//!
//! Embeddable OAuth 2.0 authorization-server engine.
//!
//! This crate provides:
//! - Authorization Code Grant and Implicit Grant processing
//! - Opaque bearer token issuance and verification
//! - Pluggable storage through the [`store::AuthCache`] and
//!   [`store::ClientStore`] traits
//! - An [`oauth::flow::Authenticator`] seam for the embedding application's
//!   login and consent experience
//! - Axum handlers and a bearer-verification extractor
//!
//! ## Overview
//!
//! The engine implements the server-side mechanics of RFC 6749 for public
//! clients: request validation, redirect resolution, code and token
//! lifecycle, and response encoding. Everything user-facing (who is logged
//! in, whether they consent) is delegated to the embedder through the
//! `Authenticator` trait. An in-memory storage backend ships separately in
//! the `wicket-cache-memory` crate.
//!
//! ## Modules
//!
//! - [`config`] - Engine configuration (lifetimes, error URIs)
//! - [`error`] - Error taxonomy mapped to OAuth 2.0 wire codes
//! - [`oauth`] - Grant processing: validation, dispatch, encoding
//! - [`store`] - Code/token lifecycle over storage traits
//! - [`secret`] - Code and token value generation
//! - [`authenticator`] - Ready-made `Authenticator` implementations
//! - [`http`] - Axum handlers for the OAuth endpoints
//! - [`middleware`] - Bearer-verification extractor and error responses

pub mod authenticator;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod secret;
pub mod store;
pub mod types;

pub use authenticator::{ApprovalList, Redirecter};
pub use config::OAuthConfig;
pub use error::{AuthError, ErrorCategory};
pub use http::{router, OAuthState};
pub use middleware::{AuthState, BearerAuth};
pub use oauth::{
    AuthorizationEngine, AuthorizationRequest, Authenticator, AuthorizeOutcome, CodeFlow,
    ImplicitFlow, TokenExchangeRequest, TokenResponse,
};
pub use secret::generate_secret;
pub use store::{AuthCache, CacheError, ClientStore, CodeEntry, IssuedToken, TokenEntry, TokenStore};
pub use types::{Client, ClientType};

/// Type alias for engine results.
pub type AuthResult<T> = Result<T, AuthError>;
