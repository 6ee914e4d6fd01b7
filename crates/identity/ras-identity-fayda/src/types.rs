//! OAuth2 / OIDC protocol types.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Userinfo claims requested as essential on every authorization request.
pub const ESSENTIAL_USERINFO_CLAIMS: &[&str] = &[
    "name",
    "phone",
    "email",
    "picture",
    "gender",
    "birthdate",
    "address",
];

/// Caller options for building an authorization URL
#[derive(Debug, Clone, Default)]
pub struct AuthorizationOptions {
    /// Space separated scopes, defaults to [`crate::DEFAULT_SCOPES`]
    pub scope: Option<String>,
    /// CSRF state, generated when absent
    pub state: Option<String>,
    /// Overrides the configured redirect URI
    pub redirect_uri: Option<String>,
}

impl AuthorizationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }
}

/// Result of building an authorization URL.
///
/// The caller must keep `code_verifier` (session, encrypted cookie) until the
/// callback arrives; it is required for the token exchange and is not part of
/// `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub url: String,
    pub code_verifier: String,
    pub state: String,
}

/// OAuth2 token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Error body returned by the provider on non-success responses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProviderErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl ProviderErrorBody {
    pub fn message(self) -> Option<String> {
        self.error_description
            .filter(|s| !s.is_empty())
            .or(self.error.filter(|s| !s.is_empty()))
    }
}

/// Identity claims of the authenticated user.
///
/// Keys are claim names exactly as the provider sent them; nothing is
/// renamed or dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn get_str(&self, claim: &str) -> Option<&str> {
        self.get(claim).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    pub fn phone(&self) -> Option<&str> {
        self.get_str("phone_number")
            .or_else(|| self.get_str("phone"))
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// The OIDC `claims` request parameter.
///
/// Serializes as
/// `{"userinfo":{"<claim>":{"essential":true},...},"id_token":{}}`
/// keeping the claim order of the list it was built from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClaimsRequest {
    userinfo: EssentialClaims,
    id_token: EssentialClaims,
}

impl ClaimsRequest {
    pub const fn new(userinfo: &'static [&'static str]) -> Self {
        Self {
            userinfo: EssentialClaims(userinfo),
            id_token: EssentialClaims(&[]),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for ClaimsRequest {
    fn default() -> Self {
        Self::new(ESSENTIAL_USERINFO_CLAIMS)
    }
}

#[derive(Debug, Clone, Copy)]
struct EssentialClaims(&'static [&'static str]);

#[derive(Serialize)]
struct Essential {
    essential: bool,
}

impl Serialize for EssentialClaims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for claim in self.0 {
            map.serialize_entry(claim, &Essential { essential: true })?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_request_json() {
        let json = ClaimsRequest::default().to_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"userinfo":{"name":{"essential":true},"phone":{"essential":true},"#,
                r#""email":{"essential":true},"picture":{"essential":true},"#,
                r#""gender":{"essential":true},"birthdate":{"essential":true},"#,
                r#""address":{"essential":true}},"id_token":{}}"#
            )
        );
    }

    #[test]
    fn test_token_response_minimal() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"tok123"}"#).unwrap();
        assert_eq!(token.access_token, "tok123");
        assert!(token.id_token.is_none());
        assert!(token.token_type.is_none());
    }

    #[test]
    fn test_provider_error_message_precedence() {
        let body: ProviderErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"code expired"}"#,
        )
        .unwrap();
        assert_eq!(body.message().as_deref(), Some("code expired"));

        let body: ProviderErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":""}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("invalid_grant"));

        assert_eq!(ProviderErrorBody::default().message(), None);
    }

    #[test]
    fn test_user_profile_accessors() {
        let value = serde_json::json!({
            "sub": "user1",
            "name": "Abebe Bikila",
            "phone_number": "+251900000000",
            "address": {"locality": "Addis Ababa"}
        });
        let profile: UserProfile = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(profile.subject(), Some("user1"));
        assert_eq!(profile.name(), Some("Abebe Bikila"));
        assert_eq!(profile.phone(), Some("+251900000000"));
        assert_eq!(profile.email(), None);
        assert!(profile.get("address").unwrap().is_object());
        assert_eq!(profile.into_value(), value);
    }
}
