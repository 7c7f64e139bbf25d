//! OAuth 2.0 client domain types.

use serde::{Deserialize, Serialize};

/// OAuth 2.0 client types as defined in RFC 6749 Section 2.1.
///
/// Only public clients are supported by this engine; confidential-client
/// authentication is left to the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// A client incapable of keeping credentials confidential
    /// (browser apps, native apps).
    Public,
}

impl ClientType {
    /// Returns the registered client-type string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client registered with the authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// The registered client type.
    pub client_type: ClientType,

    /// The redirect URI registered for this client.
    /// Empty when the client accepts any syntactically valid redirect URI.
    #[serde(default)]
    pub redirect_uri: String,
}

impl Client {
    /// Creates a new public client registration.
    #[must_use]
    pub fn public(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_type: ClientType::Public,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Validates a candidate redirect URI against the registered value.
    ///
    /// An empty registration is permissive; otherwise the candidate must
    /// match the registered URI exactly. Prefix or pattern matching is
    /// deliberately not offered: exact comparison is the only rule that
    /// cannot be abused for open redirects.
    #[must_use]
    pub fn validate_redirect_uri(&self, uri: &str) -> bool {
        self.redirect_uri.is_empty() || self.redirect_uri == uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_redirect_match() {
        let client = Client::public("client1", "https://cb.example/");
        assert!(client.validate_redirect_uri("https://cb.example/"));
        assert!(!client.validate_redirect_uri("https://cb.example/other"));
        assert!(!client.validate_redirect_uri("https://evil.example/"));
    }

    #[test]
    fn test_empty_registration_is_permissive() {
        let client = Client::public("client1", "");
        assert!(client.validate_redirect_uri("https://anywhere.example/"));
    }

    #[test]
    fn test_client_type_display() {
        assert_eq!(ClientType::Public.to_string(), "public");
    }
}
