//! PKCE (RFC 7636) verifier and challenge generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Random bytes drawn for a code verifier, giving a 58 character verifier.
pub const DEFAULT_VERIFIER_BYTES: usize = 43;

pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// PKCE code challenge and verifier
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

impl Default for PkceChallenge {
    fn default() -> Self {
        Self::new()
    }
}

impl PkceChallenge {
    /// Generate a new PKCE challenge
    pub fn new() -> Self {
        let code_verifier = generate_code_verifier(DEFAULT_VERIFIER_BYTES);
        let code_challenge = derive_code_challenge(&code_verifier);

        Self {
            code_verifier,
            code_challenge,
            code_challenge_method: CODE_CHALLENGE_METHOD.to_string(),
        }
    }
}

/// Draw `byte_length` bytes from the OS CSPRNG and encode them as unpadded
/// base64url.
///
/// RFC 7636 bounds the verifier to 43..=128 characters, which corresponds to
/// 32..=96 input bytes.
pub fn generate_code_verifier(byte_length: usize) -> String {
    random_url_safe(byte_length)
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn derive_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub(crate) fn random_url_safe(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
