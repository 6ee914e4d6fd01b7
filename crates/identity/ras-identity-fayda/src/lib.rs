//! OpenID Connect client for Fayda, the Ethiopian national ID (MOSIP eSignet).
//!
//! This crate implements the Authorization Code flow with PKCE and private-key
//! JWT client authentication:
//!
//! 1. [`FaydaClient::authorization_url`] builds the login URL together with the
//!    PKCE verifier the caller has to keep until the callback.
//! 2. [`FaydaClient::exchange_code_for_user`] signs a client assertion, redeems
//!    the authorization code and returns the user's claims from the userinfo
//!    endpoint.
//!
//! ```no_run
//! use ras_identity_fayda::{AuthorizationOptions, ClientConfig, Environment, FaydaClient};
//!
//! # async fn run(private_key_pem: &str, code: &str) -> ras_identity_fayda::FaydaResult<()> {
//! let config = ClientConfig::new("my-client-id", private_key_pem, Environment::Uat)?
//!     .with_redirect_uri("http://localhost:3000/callback");
//! let client = FaydaClient::new(config)?;
//!
//! let login = client.authorization_url(AuthorizationOptions::default())?;
//! // redirect to login.url, keep login.code_verifier and login.state
//!
//! let profile = client
//!     .exchange_code_for_user(code, &login.code_verifier, None)
//!     .await?;
//! println!("signed in as {:?}", profile.name());
//! # Ok(())
//! # }
//! ```

mod assertion;
mod client;
mod config;
mod error;
mod jwt;
mod pkce;
mod types;


pub use assertion::{
    CLIENT_ASSERTION_TTL, CLIENT_ASSERTION_TYPE, ClientAssertionClaims, KeyFormat, KeyMaterial,
    RsaJwkMaterial, sign_client_assertion,
};
pub use client::{FaydaClient, STATE_BYTES};
pub use config::{
    ClientConfig, DEFAULT_HTTP_TIMEOUT, DEFAULT_SCOPES, Environment, EnvironmentEndpoints,
};
pub use error::{FaydaError, FaydaResult, TransportError};
pub use jwt::decode_payload;
pub use pkce::{
    CODE_CHALLENGE_METHOD, DEFAULT_VERIFIER_BYTES, PkceChallenge, derive_code_challenge,
    generate_code_verifier,
};
pub use types::{
    AuthorizationOptions, AuthorizationRequest, ClaimsRequest, ESSENTIAL_USERINFO_CLAIMS,
    TokenResponse, UserProfile,
};

// Re-exported so callers don't need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
