//! Configuration types for the DDNS system
//!
//! The per-domain settings live in a JSON document under a `Domains` key:
//!
//! ```json
//! {
//!   "Domains": {
//!     "home.example.com": {
//!       "Provider": "aliyun",
//!       "AccessKey": "...",
//!       "Secret": "...",
//!       "AccessToken": "..."
//!     }
//!   }
//! }
//! ```
//!
//! Process-level settings (listen address, environment, log level) are read
//! from environment variables by the daemon.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Per-domain settings keyed by the full domain name
    #[serde(rename = "Domains", default)]
    pub domains: HashMap<String, DomainConfig>,
}

impl DdnsConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration document
    ///
    /// Domain keys are normalized to lowercase so lookups are case-insensitive.
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let raw: DdnsConfig = serde_json::from_str(json)?;
        Ok(Self {
            domains: raw
                .domains
                .into_iter()
                .map(|(name, config)| (name.to_lowercase(), config))
                .collect(),
        })
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Add a domain entry
    pub fn with_domain(mut self, name: impl Into<String>, config: DomainConfig) -> Self {
        self.domains.insert(name.into().to_lowercase(), config);
        self
    }

    /// Look up the settings of a domain
    pub fn domain(&self, name: &str) -> Option<&DomainConfig> {
        self.domains.get(&name.to_lowercase())
    }

    /// Validate the configuration
    ///
    /// Only structural problems are rejected here. Entries with missing fields
    /// are accepted and reported per request, see [`DdnsConfig::incomplete_domains`].
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domains.keys().any(|name| name.trim().is_empty()) {
            return Err(crate::Error::config("Domain names cannot be empty"));
        }
        Ok(())
    }

    /// Names of domains whose entry lacks at least one required field
    pub fn incomplete_domains(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .domains
            .iter()
            .filter(|(_, config)| config.missing_field().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

/// Settings of a single domain
///
/// Missing fields deserialize as empty strings so that the request handler
/// can tell which one is absent.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DomainConfig {
    /// Registered provider name (e.g. "aliyun")
    pub provider: String,
    /// Provider access key id
    pub access_key: String,
    /// Provider access key secret
    pub secret: String,
    /// Token the caller must present
    pub access_token: String,
}

impl DomainConfig {
    /// Create a domain configuration
    pub fn new(
        provider: impl Into<String>,
        access_key: impl Into<String>,
        secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            access_key: access_key.into(),
            secret: secret.into(),
            access_token: access_token.into(),
        }
    }

    /// First required field that is blank, in check order
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("provider", &self.provider),
            ("access key", &self.access_key),
            ("secret", &self.secret),
            ("access token", &self.access_token),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

// Credentials never show up in Debug output
impl std::fmt::Debug for DomainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainConfig")
            .field("provider", &self.provider)
            .field("access_key", &"<REDACTED>")
            .field("secret", &"<REDACTED>")
            .field("access_token", &"<REDACTED>")
            .finish()
    }
}

/// Hosting environment, selects how the caller IP is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Behind a reverse proxy: trust `X-Forwarded-For`
    #[default]
    Production,
    /// Local testing: ask an external IP-echo service
    Development,
}

impl Environment {
    /// Whether this is the development environment
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(crate::Error::config(format!(
                "Unknown environment '{}', expected production or development",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "Domains": {
            "Home.Example.com": {
                "Provider": "aliyun",
                "AccessKey": "key",
                "Secret": "secret",
                "AccessToken": "token"
            },
            "nas.example.com": {
                "Provider": "aliyun",
                "AccessKey": "key"
            }
        }
    }"#;

    #[test]
    fn test_parse_domains() {
        let config = DdnsConfig::from_json_str(SAMPLE).unwrap();

        let home = config.domain("home.example.com").unwrap();
        assert_eq!(home.provider, "aliyun");
        assert_eq!(home.access_token, "token");
        assert!(home.missing_field().is_none());

        // Keys are case-insensitive
        assert!(config.domain("HOME.EXAMPLE.COM").is_some());
        assert!(config.domain("unknown.example.com").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let config = DdnsConfig::from_json_str(SAMPLE).unwrap();
        let nas = config.domain("nas.example.com").unwrap();

        assert_eq!(nas.secret, "");
        assert_eq!(nas.missing_field(), Some("secret"));
        assert_eq!(config.incomplete_domains(), vec!["nas.example.com".to_string()]);
    }

    #[test]
    fn test_missing_field_order() {
        assert_eq!(DomainConfig::default().missing_field(), Some("provider"));
        assert_eq!(
            DomainConfig::new("aliyun", " ", "s", "t").missing_field(),
            Some("access key")
        );
        assert_eq!(
            DomainConfig::new("aliyun", "k", "s", "").missing_field(),
            Some("access token")
        );
    }

    #[test]
    fn test_empty_document() {
        let config = DdnsConfig::from_json_str("{}").unwrap();
        assert!(config.domains.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = DdnsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.domains.len(), 2);

        assert!(DdnsConfig::from_file("/nonexistent/appsettings.json").is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = DomainConfig::new("aliyun", "LTAIkey123", "supersecret", "tok3n");
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("aliyun"));
        assert!(!debug_str.contains("LTAIkey123"));
        assert!(!debug_str.contains("supersecret"));
        assert!(!debug_str.contains("tok3n"));
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
        assert!(!Environment::default().is_development());
    }
}
