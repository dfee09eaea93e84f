//! Type registry HTTP client
//!
//! Fetches declaration text for a module specifier from a remote registry.
//! The registry is a plain HTTP endpoint: a GET keyed by module name (and
//! optional version) that returns declaration-file text on success. Any
//! non-success status, transport failure, or unusable body is treated
//! uniformly as "unavailable" by the fetch coordinator.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Default registry URL
pub const DEFAULT_REGISTRY: &str = "https://types.typedock.dev/api/v1";

/// Errors that can occur while fetching declaration text
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// No declarations published for the module
    #[error("No declarations found for module: {0}")]
    NotFound(String),

    /// Registry responded with a non-success status
    #[error("Registry returned status {status} for {module}")]
    Unavailable { module: String, status: u16 },

    /// Response body was empty
    #[error("Empty declaration body for module: {0}")]
    EmptyBody(String),

    /// Response body is not usable declaration text
    #[error("Response for {0} is not declaration text")]
    NotDeclarationText(String),

    /// Invalid registry URL
    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),
}

/// Source of declaration text for module specifiers.
///
/// Abstracting the registry behind a trait keeps the fetch coordinator
/// testable without a live endpoint.
#[async_trait]
pub trait TypeRegistry: Send + Sync {
    /// Fetch declaration text for a module, optionally pinned to a version.
    async fn fetch_declaration(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<String, RegistryError>;
}

/// HTTP client for the declaration registry.
pub struct HttpTypeRegistry {
    /// HTTP client
    client: Client,

    /// Base URL for the registry
    base_url: String,
}

impl HttpTypeRegistry {
    /// Create a client for the default registry.
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_url(DEFAULT_REGISTRY)
    }

    /// Create a client for a custom registry URL.
    pub fn with_url(base_url: &str) -> Result<Self, RegistryError> {
        url::Url::parse(base_url)
            .map_err(|_| RegistryError::InvalidUrl(base_url.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("typedock/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET /types/{name} or /types/{name}/{version}
    fn declaration_url(&self, name: &str, version: Option<&str>) -> String {
        let encoded = encode_module_name(name);
        match version {
            Some(version) => format!("{}/types/{}/{}", self.base_url, encoded, version),
            None => format!("{}/types/{}", self.base_url, encoded),
        }
    }
}

#[async_trait]
impl TypeRegistry for HttpTypeRegistry {
    async fn fetch_declaration(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<String, RegistryError> {
        let url = self.declaration_url(name, version);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(name.to_string()));
        }

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable {
                module: name.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        validate_declaration_body(name, &body)?;

        Ok(body)
    }
}

/// Reject bodies that cannot be declaration text.
///
/// A registry fronted by a CDN can answer 200 with an HTML error page;
/// treating that as a successful fetch would register garbage with the
/// host.
fn validate_declaration_body(name: &str, body: &str) -> Result<(), RegistryError> {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return Err(RegistryError::EmptyBody(name.to_string()));
    }

    if trimmed.starts_with('<') {
        return Err(RegistryError::NotDeclarationText(name.to_string()));
    }

    Ok(())
}

/// Encode a module name for a URL path.
///
/// Handles scoped modules (@org/name) by encoding the inner slash.
fn encode_module_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped module: @org/name -> @org%2Fname
        name.replacen('/', "%2F", 1)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_module_name() {
        assert_eq!(encode_module_name("lodash"), "lodash");
        assert_eq!(encode_module_name("left-pad"), "left-pad");
        assert_eq!(encode_module_name("@org/pkg"), "@org%2Fpkg");
    }

    #[test]
    fn test_declaration_url() {
        let registry = HttpTypeRegistry::with_url("https://example.test/api/v1/").unwrap();
        assert_eq!(
            registry.declaration_url("lodash", None),
            "https://example.test/api/v1/types/lodash"
        );
        assert_eq!(
            registry.declaration_url("lodash", Some("4.17.21")),
            "https://example.test/api/v1/types/lodash/4.17.21"
        );
    }

    #[test]
    fn test_validate_declaration_body() {
        assert!(validate_declaration_body("pkg", "declare module 'pkg';").is_ok());
        assert!(matches!(
            validate_declaration_body("pkg", "   \n"),
            Err(RegistryError::EmptyBody(_))
        ));
        assert!(matches!(
            validate_declaration_body("pkg", "<!DOCTYPE html><html>Not Found</html>"),
            Err(RegistryError::NotDeclarationText(_))
        ));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = HttpTypeRegistry::with_url("not-a-url");
        assert!(matches!(result, Err(RegistryError::InvalidUrl(_))));
    }

    #[test]
    fn test_default_registry_url() {
        assert_eq!(DEFAULT_REGISTRY, "https://types.typedock.dev/api/v1");
    }
}
