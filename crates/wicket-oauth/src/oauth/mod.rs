//! OAuth 2.0 grant processing.
//!
//! - [`authorize`]: authorization endpoint types, validation, redirect
//!   encoding.
//! - [`flow`]: grant dispatch and the [`Authenticator`](flow::Authenticator)
//!   continuation.
//! - [`token`]: token endpoint types and validation.

pub mod authorize;
pub mod flow;
pub mod token;

pub use authorize::{
    resolve_redirect_uri, validate_authorization, AuthorizationRequest, ParamPlacement,
    RedirectTarget, ResponseType,
};
pub use flow::{AuthorizationEngine, Authenticator, AuthorizeOutcome, CodeFlow, ImplicitFlow};
pub use token::{validate_token_exchange, ErrorBody, TokenExchangeRequest, TokenResponse};
