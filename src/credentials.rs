//! Credential resolution
//!
//! Turns stored credential fields into a concrete base URL plus bearer token.
//! Resolution happens once per run; nothing here touches the network.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CredentialsConfig;

pub const PRODUCTION_URL: &str = "https://api.allsign.io";
pub const SANDBOX_URL: &str = "https://api-sandbox.allsign.io";

/// Fixed AllSign deployments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_URL,
            Environment::Sandbox => SANDBOX_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Sandbox => write!(f, "sandbox"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = eyre::Error;

    fn from_str(s: &str) -> eyre::Result<Self> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "sandbox" => Ok(Environment::Sandbox),
            _ => eyre::bail!("Unknown environment: {}. Supported: production, sandbox", s),
        }
    }
}

/// Where requests go: a literal URL or one of the fixed environments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Literal(String),
    Environment(Environment),
}

impl Endpoint {
    /// Pick the endpoint from stored fields. A non-empty literal URL wins,
    /// then the environment selector, then production.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        match config.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Endpoint::Literal(url.to_string()),
            _ => Endpoint::Environment(config.environment.unwrap_or_default()),
        }
    }

    /// Concrete base URL with trailing slashes stripped
    pub fn base_url(&self) -> String {
        let url = match self {
            Endpoint::Literal(url) => url.as_str(),
            Endpoint::Environment(env) => env.base_url(),
        };
        url.trim_end_matches('/').to_string()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Environment(Environment::Production)
    }
}

/// Unresolved credentials: the API key plus an endpoint selector
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub endpoint: Endpoint,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint,
        }
    }

    pub fn resolve(&self) -> ResolvedCredentials {
        ResolvedCredentials {
            base_url: self.endpoint.base_url(),
            api_key: self.api_key.clone(),
        }
    }
}

/// Credentials ready for request construction
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub base_url: String,
    api_key: String,
}

impl ResolvedCredentials {
    /// `Authorization` header name and value
    pub fn auth_header(&self) -> (String, String) {
        ("Authorization".to_string(), format!("Bearer {}", self.api_key))
    }

    /// Join an absolute API path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
