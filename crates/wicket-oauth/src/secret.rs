//! Opaque identifier generation for authorization codes and access tokens.
//!
//! # Security
//!
//! Identifiers are 256-bit random values drawn from the thread-local CSPRNG
//! and encoded as base64url without padding (43 characters). This exceeds
//! the OAuth 2.0 recommendation of at least 128 bits of entropy and makes
//! codes and tokens unguessable.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Generates a new cryptographically secure opaque identifier.
///
/// Used for both authorization codes and access tokens; the two are
/// distinguished only by which store namespace they are registered in.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
