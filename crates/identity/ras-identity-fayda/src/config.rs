//! Client configuration and the Fayda environment table.

use crate::error::{FaydaError, FaydaResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Scopes requested when the caller does not pass any.
pub const DEFAULT_SCOPES: &str = "openid profile email phone";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const ACR_VALUES: &str =
    "mosip:idp:acr:generated-code mosip:idp:acr:linked-wallet mosip:idp:acr:biometrics";

const ENV_CLIENT_ID: &str = "FAYDA_CLIENT_ID";
const ENV_PRIVATE_KEY: &str = "FAYDA_PRIVATE_KEY";
const ENV_ENVIRONMENT: &str = "FAYDA_ENVIRONMENT";
const ENV_REDIRECT_URI: &str = "FAYDA_REDIRECT_URI";
const ENV_HTTP_TIMEOUT_SECS: &str = "FAYDA_HTTP_TIMEOUT_SECS";

/// Fayda deployment target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    #[default]
    Uat,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Uat => "UAT",
            Environment::Prod => "PROD",
        }
    }

    /// Endpoint set published for this environment.
    pub fn endpoints(&self) -> EnvironmentEndpoints {
        match self {
            Environment::Uat => EnvironmentEndpoints {
                issuer: "https://esignet.ida.fayda.et".to_string(),
                authorization_endpoint: "https://esignet.ida.fayda.et/authorize".to_string(),
                token_endpoint: "https://esignet.ida.fayda.et/v1/esignet/oauth/v2/token"
                    .to_string(),
                userinfo_endpoint: "https://esignet.ida.fayda.et/v1/esignet/oidc/userinfo"
                    .to_string(),
                acr_values: ACR_VALUES.to_string(),
            },
            // Production issuer has to be confirmed with NIDP during onboarding.
            Environment::Prod => EnvironmentEndpoints {
                issuer: "https://id.gov.et".to_string(),
                authorization_endpoint: "https://id.gov.et/authorize".to_string(),
                token_endpoint: "https://id.gov.et/v1/esignet/oauth/v2/token".to_string(),
                userinfo_endpoint: "https://id.gov.et/v1/esignet/oidc/userinfo".to_string(),
                acr_values: ACR_VALUES.to_string(),
            },
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = FaydaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UAT" => Ok(Environment::Uat),
            "PROD" => Ok(Environment::Prod),
            other => Err(FaydaError::Config(format!(
                "Invalid environment: {}. Use 'UAT' or 'PROD'.",
                other
            ))),
        }
    }
}

/// Provider endpoints for one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentEndpoints {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    /// Space separated authentication context references
    pub acr_values: String,
}

/// Immutable client configuration.
///
/// Constructed once per relying party. The private key is kept as the raw
/// string it was supplied as and only parsed when a client assertion is signed.
#[derive(Clone)]
pub struct ClientConfig {
    client_id: String,
    private_key: String,
    environment: Environment,
    endpoints: EnvironmentEndpoints,
    redirect_uri: Option<String>,
    http_timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        private_key: impl Into<String>,
        environment: Environment,
    ) -> FaydaResult<Self> {
        let client_id = client_id.into();
        let private_key = private_key.into();

        if client_id.trim().is_empty() || private_key.trim().is_empty() {
            return Err(FaydaError::Config(
                "clientId and privateKey are required".to_string(),
            ));
        }

        Ok(Self {
            client_id,
            private_key,
            environment,
            endpoints: environment.endpoints(),
            redirect_uri: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    /// Load configuration from `FAYDA_*` process environment variables.
    ///
    /// `FAYDA_CLIENT_ID` and `FAYDA_PRIVATE_KEY` are required,
    /// `FAYDA_ENVIRONMENT` defaults to `UAT`, `FAYDA_REDIRECT_URI` and
    /// `FAYDA_HTTP_TIMEOUT_SECS` are optional.
    pub fn from_env() -> FaydaResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FaydaResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| FaydaError::Config(format!("{} is not set", key)))
        };

        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Environment::default(),
        };

        let mut config = Self::new(
            required(ENV_CLIENT_ID)?,
            required(ENV_PRIVATE_KEY)?,
            environment,
        )?;

        if let Some(uri) = lookup(ENV_REDIRECT_URI).filter(|v| !v.trim().is_empty()) {
            config = config.with_redirect_uri(uri);
        }

        if let Some(secs) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                FaydaError::Config(format!(
                    "{} must be a whole number of seconds",
                    ENV_HTTP_TIMEOUT_SECS
                ))
            })?;
            config = config.with_http_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Point the client at a different endpoint set, e.g. a staging mirror.
    pub fn with_endpoints(mut self, endpoints: EnvironmentEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn endpoints(&self) -> &EnvironmentEndpoints {
        &self.endpoints
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    /// Call-site redirect URI wins over the configured default.
    /// Empty values count as absent on both sides.
    pub(crate) fn resolve_redirect_uri<'a>(
        &'a self,
        explicit: Option<&'a str>,
    ) -> FaydaResult<&'a str> {
        explicit
            .filter(|uri| !uri.trim().is_empty())
            .or_else(|| {
                self.redirect_uri
                    .as_deref()
                    .filter(|uri| !uri.trim().is_empty())
            })
            .ok_or_else(|| {
                FaydaError::Config(
                    "redirectUri is required in constructor or method call".to_string(),
                )
            })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("private_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("endpoints", &self.endpoints)
            .field("redirect_uri", &self.redirect_uri)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_requires_client_id_and_private_key() {
        let result = ClientConfig::new("", "key", Environment::Uat);
        assert!(matches!(result, Err(FaydaError::Config(_))));

        let result = ClientConfig::new("client", "   ", Environment::Uat);
        assert!(matches!(result, Err(FaydaError::Config(_))));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("UAT".parse::<Environment>().unwrap(), Environment::Uat);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert!(matches!(
            "staging".parse::<Environment>(),
            Err(FaydaError::Config(_))
        ));
    }

    #[test]
    fn test_endpoints_follow_environment() {
        let config = ClientConfig::new("client", "key", Environment::Prod).unwrap();
        assert_eq!(config.endpoints(), &Environment::Prod.endpoints());
        assert!(config.endpoints().token_endpoint.starts_with("https://id.gov.et"));

        let uat = Environment::default().endpoints();
        assert_eq!(uat.issuer, "https://esignet.ida.fayda.et");
        assert!(uat.authorization_endpoint.starts_with(&uat.issuer));
    }

    #[test]
    fn test_redirect_uri_resolution() {
        let config = ClientConfig::new("client", "key", Environment::Uat).unwrap();
        assert!(matches!(
            config.resolve_redirect_uri(None),
            Err(FaydaError::Config(_))
        ));
        assert_eq!(
            config.resolve_redirect_uri(Some("http://localhost/cb")).unwrap(),
            "http://localhost/cb"
        );

        let config = config.with_redirect_uri("http://localhost/default");
        assert_eq!(
            config.resolve_redirect_uri(None).unwrap(),
            "http://localhost/default"
        );
        assert_eq!(
            config.resolve_redirect_uri(Some("http://localhost/other")).unwrap(),
            "http://localhost/other"
        );
        assert_eq!(
            config.resolve_redirect_uri(Some("")).unwrap(),
            "http://localhost/default"
        );
    }

    #[test]
    fn test_empty_default_redirect_uri_is_absent() {
        let config = ClientConfig::new("client", "key", Environment::Uat)
            .unwrap()
            .with_redirect_uri("");
        assert!(matches!(
            config.resolve_redirect_uri(None),
            Err(FaydaError::Config(_))
        ));
        assert!(matches!(
            config.resolve_redirect_uri(Some("")),
            Err(FaydaError::Config(_))
        ));

        let config = config.with_redirect_uri("   ");
        assert!(matches!(
            config.resolve_redirect_uri(None),
            Err(FaydaError::Config(_))
        ));
        assert_eq!(
            config.resolve_redirect_uri(Some("http://localhost/cb")).unwrap(),
            "http://localhost/cb"
        );
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config =
            ClientConfig::new("client", "super-secret-key", Environment::Uat).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("FAYDA_CLIENT_ID", "client"),
            ("FAYDA_PRIVATE_KEY", "key"),
            ("FAYDA_ENVIRONMENT", "prod"),
            ("FAYDA_REDIRECT_URI", "http://localhost:3000/callback"),
            ("FAYDA_HTTP_TIMEOUT_SECS", "5"),
        ]);

        let config =
            ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.client_id(), "client");
        assert_eq!(config.environment(), Environment::Prod);
        assert_eq!(config.redirect_uri(), Some("http://localhost:3000/callback"));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_missing_values() {
        let result = ClientConfig::from_lookup(|key| match key {
            "FAYDA_CLIENT_ID" => Some("client".to_string()),
            _ => None,
        });
        assert!(matches!(
            result,
            Err(FaydaError::Config(msg)) if msg.contains("FAYDA_PRIVATE_KEY")
        ));

        let result = ClientConfig::from_lookup(|key| match key {
            "FAYDA_CLIENT_ID" => Some("client".to_string()),
            "FAYDA_PRIVATE_KEY" => Some("key".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(result.environment(), Environment::Uat);
        assert_eq!(result.http_timeout(), DEFAULT_HTTP_TIMEOUT);
    }
}
