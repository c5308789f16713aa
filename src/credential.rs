//! Session credential boundary.
//!
//! Every connect fetches one short-lived credential from an external
//! provider. There is exactly one attempt per connect and no retry or expiry
//! handling; a provider may report "absent" (`Ok(None)`) as a well-defined
//! outcome distinct from a transport-level failure.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Client Secret
// ─────────────────────────────────────────────────────────────────

/// A short-lived transport credential. Redacted in Debug output so it never
/// leaks into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for handing to the transport.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientSecret(***)")
    }
}

// ─────────────────────────────────────────────────────────────────
// Credential Provider
// ─────────────────────────────────────────────────────────────────

/// Source of session credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Fetch a credential. `Ok(None)` means the provider answered but had no
    /// secret to give; `Err` means the request itself failed. Either way the
    /// caller aborts the connect without retrying.
    async fn fetch(&self) -> Result<Option<ClientSecret>>;
}

// ─────────────────────────────────────────────────────────────────
// HTTP Provider
// ─────────────────────────────────────────────────────────────────

/// Expected response shape of the session endpoint.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    client_secret: Option<SecretField>,
}

#[derive(Debug, Deserialize)]
struct SecretField {
    value: Option<String>,
}

/// Fetches credentials from an HTTP session endpoint.
pub struct HttpCredentialProvider {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCredentialProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CredentialProvider for HttpCredentialProvider {
    async fn fetch(&self) -> Result<Option<ClientSecret>> {
        debug!(endpoint = %self.endpoint, "Fetching session credential");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::credential_fetch(&self.endpoint, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::credential_fetch(
                &self.endpoint,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| Error::credential_fetch(&self.endpoint, e.to_string()))?;

        Ok(body
            .client_secret
            .and_then(|s| s.value)
            .filter(|v| !v.is_empty())
            .map(ClientSecret::new))
    }
}

// ─────────────────────────────────────────────────────────────────
// Static Provider
// ─────────────────────────────────────────────────────────────────

/// Serves a fixed credential (or a fixed outcome). Used when the secret comes
/// from the environment, and by tests.
pub struct StaticCredentialProvider {
    secret: Option<ClientSecret>,
    fail: bool,
}

impl StaticCredentialProvider {
    /// Always returns the given secret.
    pub fn fixed(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(ClientSecret::new(secret)),
            fail: false,
        }
    }

    /// Always reports the well-defined "absent" outcome.
    pub fn absent() -> Self {
        Self {
            secret: None,
            fail: false,
        }
    }

    /// Always fails the fetch itself.
    pub fn failing() -> Self {
        Self {
            secret: None,
            fail: true,
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn fetch(&self) -> Result<Option<ClientSecret>> {
        if self.fail {
            return Err(Error::credential_fetch("static", "injected failure"));
        }
        Ok(self.secret.clone())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_secret_debug_is_redacted() {
        let secret = ClientSecret::new("ek_live_very_secret");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("very_secret"));
        assert_eq!(secret.expose(), "ek_live_very_secret");
    }

    #[tokio::test]
    async fn test_static_fixed() {
        let provider = StaticCredentialProvider::fixed("ek_test");
        let secret = provider.fetch().await.unwrap().unwrap();
        assert_eq!(secret.expose(), "ek_test");
    }

    #[tokio::test]
    async fn test_static_absent() {
        let provider = StaticCredentialProvider::absent();
        assert!(provider.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_static_failing() {
        let provider = StaticCredentialProvider::failing();
        assert!(provider.fetch().await.is_err());
    }

    #[test]
    fn test_session_response_parsing() {
        let body: SessionResponse =
            serde_json::from_str(r#"{"client_secret": {"value": "ek_abc"}}"#).unwrap();
        assert_eq!(body.client_secret.unwrap().value.unwrap(), "ek_abc");

        let body: SessionResponse = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert!(body.client_secret.is_none());
    }
}
