//! Request middleware: bearer verification and error responses.

pub mod auth;
pub mod error;

pub use auth::{AuthState, BearerAuth};
