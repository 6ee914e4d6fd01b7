//! Compact JWT payload extraction.

use crate::error::{FaydaError, FaydaResult};
use crate::types::UserProfile;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;

/// Decode the claims carried in the payload segment of a compact JWT.
///
/// This does **not** verify the signature. The claims are only as trustworthy
/// as the channel the token came from; here that is the direct TLS call to the
/// provider's userinfo endpoint made with a freshly issued access token.
/// Callers that need cryptographic assurance must verify the token against
/// the provider's published JWKS separately.
pub fn decode_payload(token: &str) -> FaydaResult<UserProfile> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(FaydaError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = segments[1].trim_end_matches('=');
    if payload.is_empty() {
        return Err(FaydaError::MalformedToken("empty payload segment".to_string()));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| FaydaError::MalformedToken(format!("payload is not base64url: {}", e)))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(UserProfile::new(claims)),
        Ok(_) => Err(FaydaError::MalformedToken(
            "payload is not a JSON object".to_string(),
        )),
        Err(e) => Err(FaydaError::MalformedToken(format!(
            "payload is not valid JSON: {}",
            e
        ))),
    }
}
