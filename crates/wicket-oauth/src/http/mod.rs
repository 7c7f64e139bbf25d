//! HTTP surface for the engine.
//!
//! Axum handlers for the authorization and token endpoints, plus a
//! combined dispatcher for embedders that mount both behind one path.

pub mod authorize;
pub mod token;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::oauth::flow::AuthorizationEngine;

/// Shared state for the OAuth handlers.
#[derive(Clone)]
pub struct OAuthState {
    /// The grant dispatcher.
    pub engine: Arc<AuthorizationEngine>,
}

impl OAuthState {
    /// Creates handler state over an engine.
    pub fn new(engine: Arc<AuthorizationEngine>) -> Self {
        Self { engine }
    }
}

/// Builds a router exposing `/authorize` and `/token`.
///
/// Embedders that want different paths, or the single-endpoint
/// [`authorize::master_handler`] dispatch, can mount the handlers
/// themselves instead.
pub fn router(state: OAuthState) -> Router {
    Router::new()
        .route("/authorize", get(authorize::authorize_handler))
        .route("/token", get(token::token_handler))
        .with_state(state)
}
