//! Configuration management

use std::{env, path::Path, str::FromStr, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use jsonwebtoken::Algorithm;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    #[serde(default)]
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// Identity provider configuration
    pub provider: ProviderConfig,
    /// Inbound authentication configuration
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Graceful shutdown timeout
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Identity provider (OpenID-Connect) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider base URL, e.g. `http://keycloak:8080`
    pub base_url: String,
    /// Realm name
    pub realm: String,
    /// OIDC client identifier used for password grants and client roles
    pub client_id: String,
    /// OIDC client secret (supports `${VAR}` expansion)
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Grant type sent to the token endpoint for logins
    pub grant_type: String,
    /// Expected JWT signing algorithm
    pub algorithm: String,
    /// Issuer override; defaults to `{base_url}/realms/{realm}`
    #[serde(default)]
    pub issuer: Option<String>,
    /// Timeout applied to every outbound provider call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            realm: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            grant_type: "password".to_string(),
            algorithm: "RS256".to_string(),
            issuer: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// `{base}/realms/{realm}`
    #[must_use]
    pub fn realm_url(&self) -> String {
        format!("{}/realms/{}", self.base(), self.realm)
    }

    /// Token endpoint
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.realm_url())
    }

    /// Published key set endpoint
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.realm_url())
    }

    /// Expected `iss` claim
    #[must_use]
    pub fn issuer(&self) -> String {
        self.issuer.clone().unwrap_or_else(|| self.realm_url())
    }

    /// Admin REST base, `{base}/admin/realms/{realm}`
    #[must_use]
    pub fn admin_url(&self) -> String {
        format!("{}/admin/realms/{}", self.base(), self.realm)
    }

    /// Parse the configured signing algorithm
    pub fn algorithm(&self) -> Result<Algorithm> {
        Algorithm::from_str(&self.algorithm)
            .map_err(|_| Error::Config(format!("Unsupported JWT algorithm: {}", self.algorithm)))
    }
}

/// Inbound authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Verify bearer tokens locally before forwarding them to the provider
    pub verify_tokens: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verify_tokens: true,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (IDP_GATEWAY_ prefix)
        figment = figment.merge(Env::prefixed("IDP_GATEWAY_").split("__"));

        let mut config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // Env files must be in the process environment before ${VAR} expansion
        config.load_env_files();
        config.expand_env_vars();

        Ok(config)
    }

    /// Check that the provider section is usable.
    pub fn validate(&self) -> Result<()> {
        let p = &self.provider;
        if p.base_url.trim().is_empty() {
            return Err(Error::Config("provider.base_url is required".to_string()));
        }
        if p.realm.trim().is_empty() {
            return Err(Error::Config("provider.realm is required".to_string()));
        }
        if p.client_id.trim().is_empty() {
            return Err(Error::Config("provider.client_id is required".to_string()));
        }
        p.algorithm()?;
        Ok(())
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => tracing::info!("Loaded env file: {expanded}"),
                    Err(e) => tracing::warn!("Failed to load env file {expanded}: {e}"),
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }

    /// Expand ${VAR} and ${VAR:-default} patterns in provider values
    fn expand_env_vars(&mut self) {
        let Ok(re) = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}") else {
            return;
        };

        self.provider.base_url = Self::expand_string(&re, &self.provider.base_url);
        self.provider.client_secret = Self::expand_string(&re, &self.provider.client_secret);
    }

    fn expand_string(re: &Regex, value: &str) -> String {
        re.replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default = caps.get(2).map_or("", |m| m.as_str());
            env::var(var_name).unwrap_or_else(|_| default.to_string())
        })
        .into_owned()
    }
}

/// Custom humantime serde module for Duration
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize Duration to human-readable string (e.g., "30s")
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    /// Deserialize human-readable duration string (e.g., "30s", "5m", "100ms")
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the string cannot be parsed as a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        // "ms" before "s": "100ms" also ends with 's'
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(serde::de::Error::custom)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(serde::de::Error::custom)
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn provider() -> ProviderConfig {
        ProviderConfig {
            base_url: "http://keycloak:8080/".to_string(),
            realm: "constrsw".to_string(),
            client_id: "oauth".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn derived_urls_follow_realm_layout() {
        let p = provider();

        assert_eq!(p.realm_url(), "http://keycloak:8080/realms/constrsw");
        assert_eq!(
            p.token_url(),
            "http://keycloak:8080/realms/constrsw/protocol/openid-connect/token"
        );
        assert_eq!(
            p.jwks_url(),
            "http://keycloak:8080/realms/constrsw/protocol/openid-connect/certs"
        );
        assert_eq!(p.admin_url(), "http://keycloak:8080/admin/realms/constrsw");
        assert_eq!(p.issuer(), "http://keycloak:8080/realms/constrsw");
    }

    #[test]
    fn issuer_override_wins() {
        let p = ProviderConfig {
            issuer: Some("https://sso.example.com/realms/constrsw".to_string()),
            ..provider()
        };
        assert_eq!(p.issuer(), "https://sso.example.com/realms/constrsw");
    }

    #[test]
    fn validate_rejects_unknown_algorithm() {
        let config = Config {
            provider: ProviderConfig {
                algorithm: "XX999".to_string(),
                ..provider()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn validate_requires_realm_and_client() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            provider: provider(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn provider_section_deserialized_from_yaml() {
        let yaml = r#"
server:
  port: 9000
provider:
  base_url: "http://kc:8080"
  realm: "demo"
  client_id: "bff"
  client_secret: "s3cret"
  request_timeout: "1500ms"
auth:
  verify_tokens: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.provider.realm, "demo");
        assert_eq!(config.provider.grant_type, "password");
        assert_eq!(config.provider.algorithm, "RS256");
        assert_eq!(config.provider.request_timeout, Duration::from_millis(1500));
        assert!(!config.auth.verify_tokens);
    }

    #[test]
    fn load_expands_secret_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("test.env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "IDP_GW_TEST_SECRET=from_env_file").unwrap();
        drop(f);

        let cfg_path = dir.path().join("gateway.yaml");
        let mut f = std::fs::File::create(&cfg_path).unwrap();
        writeln!(f, "env_files:\n  - {}", env_path.display()).unwrap();
        writeln!(f, "provider:\n  realm: r\n  client_id: c").unwrap();
        writeln!(f, "  client_secret: \"${{IDP_GW_TEST_SECRET}}\"").unwrap();
        writeln!(f, "  base_url: \"${{IDP_GW_TEST_UNSET_BASE:-http://fallback:8080}}\"").unwrap();
        drop(f);

        let config = Config::load(Some(&cfg_path)).unwrap();

        assert_eq!(config.provider.client_secret, "from_env_file");
        assert_eq!(config.provider.base_url, "http://fallback:8080");
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let result = Config::load(Some(Path::new("/nonexistent/gateway.yaml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
