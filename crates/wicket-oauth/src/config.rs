//! Engine configuration.
//!
//! Controls code and token lifetimes and the optional per-error-code
//! `error_uri` registry. All fields have defaults so an empty config
//! section is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// OAuth 2.0 engine configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [oauth]
/// authorization_code_lifetime = "2m"
/// access_token_lifetime = "1h"
///
/// [oauth.error_uris]
/// invalid_request = "https://auth.example.com/errors#invalid_request"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    /// Codes should be short-lived; they exist only to be exchanged once.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    /// A zero lifetime means tokens never expire and `expires_in` is
    /// omitted from responses.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Documentation URI per OAuth error code, included as `error_uri`
    /// in error responses when registered for the code in question.
    pub error_uris: HashMap<String, String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(120),
            access_token_lifetime: Duration::from_secs(3600),
            error_uris: HashMap::new(),
        }
    }
}

impl OAuthConfig {
    /// Registers a documentation URI for an OAuth error code.
    #[must_use]
    pub fn with_error_uri(mut self, code: impl Into<String>, uri: impl Into<String>) -> Self {
        self.error_uris.insert(code.into(), uri.into());
        self
    }

    /// Returns the registered `error_uri` for an OAuth error code, if any.
    #[must_use]
    pub fn error_uri(&self, code: &str) -> Option<&str> {
        self.error_uris.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OAuthConfig::default();
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(120));
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
        assert!(config.error_uris.is_empty());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            authorization_code_lifetime = "2m"
            access_token_lifetime = "30m"

            [error_uris]
            invalid_request = "https://auth.example.com/errors#invalid_request"
        "#;

        let config: OAuthConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(120));
        assert_eq!(config.access_token_lifetime, Duration::from_secs(1800));
        assert_eq!(
            config.error_uri("invalid_request"),
            Some("https://auth.example.com/errors#invalid_request")
        );
        assert_eq!(config.error_uri("access_denied"), None);
    }

    #[test]
    fn test_empty_section_uses_defaults() {
        let config: OAuthConfig = toml::from_str("").unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
    }

    #[test]
    fn test_with_error_uri() {
        let config = OAuthConfig::default()
            .with_error_uri("access_denied", "https://auth.example.com/denied");
        assert_eq!(
            config.error_uri("access_denied"),
            Some("https://auth.example.com/denied")
        );
    }
}
