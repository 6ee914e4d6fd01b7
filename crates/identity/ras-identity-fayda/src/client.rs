//! Fayda OIDC client: authorization URL, code exchange and userinfo.

use crate::assertion::{CLIENT_ASSERTION_TYPE, sign_client_assertion};
use crate::config::{ClientConfig, DEFAULT_SCOPES};
use crate::error::{FaydaError, FaydaResult, TransportError};
use crate::jwt::decode_payload;
use crate::pkce::{CODE_CHALLENGE_METHOD, PkceChallenge, random_url_safe};
use crate::types::{
    AuthorizationOptions, AuthorizationRequest, ClaimsRequest, ProviderErrorBody, TokenResponse,
    UserProfile,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

/// Random bytes behind a generated `state` value.
pub const STATE_BYTES: usize = 12;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    client_assertion_type: &'a str,
    client_assertion: &'a str,
    code_verifier: &'a str,
}

/// Client for the Fayda authorization code flow.
///
/// Holds no per-login state: the caller keeps the PKCE verifier between
/// [`FaydaClient::authorization_url`] and
/// [`FaydaClient::exchange_code_for_user`]. Cloning is cheap and clones share
/// one connection pool.
#[derive(Debug, Clone)]
pub struct FaydaClient {
    config: ClientConfig,
    http_client: Client,
}

impl FaydaClient {
    pub fn new(config: ClientConfig) -> FaydaResult<Self> {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| FaydaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Use a preconfigured reqwest client (proxies, custom roots, ...).
    ///
    /// The configured HTTP timeout is not applied to `http_client`.
    pub fn with_http_client(config: ClientConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the URL the user agent is redirected to.
    ///
    /// Only the S256 challenge goes into the URL. The returned
    /// `code_verifier` must be stored by the caller for the token exchange.
    pub fn authorization_url(
        &self,
        options: AuthorizationOptions,
    ) -> FaydaResult<AuthorizationRequest> {
        let redirect_uri = self
            .config
            .resolve_redirect_uri(options.redirect_uri.as_deref())?;
        let endpoints = self.config.endpoints();
        let mut url = Url::parse(&endpoints.authorization_endpoint)?;

        let pkce = PkceChallenge::new();
        let state = options
            .state
            .filter(|state| !state.is_empty())
            .unwrap_or_else(|| random_url_safe(STATE_BYTES));
        let scope = options
            .scope
            .as_deref()
            .filter(|scope| !scope.is_empty())
            .unwrap_or(DEFAULT_SCOPES);
        let claims = ClaimsRequest::default().to_json()?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id())
            .append_pair("scope", scope)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD)
            .append_pair("acr_values", &endpoints.acr_values)
            .append_pair("claims", &claims);

        debug!(
            "Generated authorization URL for client {} ({})",
            self.config.client_id(),
            self.config.environment()
        );

        Ok(AuthorizationRequest {
            url: url.into(),
            code_verifier: pkce.code_verifier,
            state,
        })
    }

    /// Exchange an authorization code for the user's identity claims.
    ///
    /// Signs a fresh client assertion, redeems `code` at the token endpoint
    /// and reads the userinfo endpoint with the resulting access token.
    /// `redirect_uri` must match the one used for the authorization URL and
    /// falls back to the configured default.
    pub async fn exchange_code_for_user(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: Option<&str>,
    ) -> FaydaResult<UserProfile> {
        self.login(code, code_verifier, redirect_uri, None).await
    }

    /// Same as [`FaydaClient::exchange_code_for_user`], aborting with
    /// [`TransportError::Cancelled`] as soon as `cancel` fires.
    pub async fn exchange_code_for_user_with_cancellation(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: Option<&str>,
        cancel: &CancellationToken,
    ) -> FaydaResult<UserProfile> {
        self.login(code, code_verifier, redirect_uri, Some(cancel)).await
    }

    /// Redeem an authorization code at the token endpoint.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: Option<&str>,
    ) -> FaydaResult<TokenResponse> {
        self.request_token(code, code_verifier, redirect_uri, None).await
    }

    /// Fetch the userinfo document for `access_token`.
    ///
    /// Fayda answers with a signed JWT; its payload is decoded without
    /// signature verification (see [`crate::decode_payload`]). Providers that
    /// answer with a plain JSON object get that object back as is, without
    /// any check that it looks like an OIDC claim set.
    pub async fn fetch_user_info(&self, access_token: &str) -> FaydaResult<UserProfile> {
        self.request_user_info(access_token, None).await
    }

    async fn login(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> FaydaResult<UserProfile> {
        let token = self
            .request_token(code, code_verifier, redirect_uri, cancel)
            .await?;
        self.request_user_info(&token.access_token, cancel).await
    }

    async fn request_token(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> FaydaResult<TokenResponse> {
        if code.is_empty() {
            return Err(FaydaError::Validation(
                "Authorization code is required".to_string(),
            ));
        }
        if code_verifier.is_empty() {
            return Err(FaydaError::Validation(
                "PKCE code_verifier is required".to_string(),
            ));
        }
        let redirect_uri = self.config.resolve_redirect_uri(redirect_uri)?;
        let token_endpoint = &self.config.endpoints().token_endpoint;

        let client_assertion = sign_client_assertion(
            self.config.client_id(),
            token_endpoint,
            self.config.private_key(),
        )?;

        let form = TokenRequest {
            grant_type: "authorization_code",
            code,
            redirect_uri,
            client_id: self.config.client_id(),
            client_assertion_type: CLIENT_ASSERTION_TYPE,
            client_assertion: &client_assertion,
            code_verifier,
        };

        let request = self.http_client.post(token_endpoint).form(&form);
        let response = cancellable(cancel, request.send()).await?;

        if !response.status().is_success() {
            let err = remote_api_error(response, cancel).await?;
            error!("Token exchange failed: {}", err);
            return Err(err);
        }

        let body = cancellable(cancel, response.text()).await?;
        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| FaydaError::InvalidTokenResponse(e.to_string()))?;

        if token_response.access_token.is_empty() {
            return Err(FaydaError::InvalidTokenResponse(
                "access_token is empty".to_string(),
            ));
        }

        info!("Successfully exchanged code for tokens");
        Ok(token_response)
    }

    async fn request_user_info(
        &self,
        access_token: &str,
        cancel: Option<&CancellationToken>,
    ) -> FaydaResult<UserProfile> {
        if access_token.is_empty() {
            return Err(FaydaError::Validation(
                "Access token is required".to_string(),
            ));
        }

        let request = self
            .http_client
            .get(&self.config.endpoints().userinfo_endpoint)
            .header(ACCEPT, "application/jwt, application/json")
            .bearer_auth(access_token);
        let response = cancellable(cancel, request.send()).await?;

        if !response.status().is_success() {
            let err = remote_api_error(response, cancel).await?;
            error!("User info request failed: {}", err);
            return Err(err);
        }

        let body = cancellable(cancel, response.text()).await?;
        let profile = parse_user_info(&body)?;

        debug!(
            "Successfully retrieved user info for subject: {}",
            profile.subject().unwrap_or("<unknown>")
        );
        Ok(profile)
    }
}

/// Await `fut`, giving up early if `cancel` fires first.
async fn cancellable<T>(
    cancel: Option<&CancellationToken>,
    fut: impl Future<Output = Result<T, reqwest::Error>>,
) -> FaydaResult<T> {
    let result = match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => return Err(TransportError::Cancelled.into()),
            result = fut => result,
        },
        None => fut.await,
    };

    result.map_err(FaydaError::from)
}

/// Build the error for a non-2xx response.
///
/// Cancellation while the body streams is returned as `Err`. Any other
/// failure to read the body falls back to the status-only message.
async fn remote_api_error(
    response: Response,
    cancel: Option<&CancellationToken>,
) -> FaydaResult<FaydaError> {
    let status = response.status();
    let body = match cancellable(cancel, response.text()).await {
        Ok(body) => body,
        Err(FaydaError::Transport(TransportError::Cancelled)) => {
            return Err(TransportError::Cancelled.into());
        }
        Err(e) => {
            warn!("Failed to read error body (status {}): {}", status.as_u16(), e);
            String::new()
        }
    };

    let message = serde_json::from_str::<ProviderErrorBody>(&body)
        .ok()
        .and_then(ProviderErrorBody::message)
        .unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));

    Ok(FaydaError::RemoteApi {
        status: status.as_u16(),
        message,
    })
}

/// Turn a userinfo body into claims.
///
/// A compact JWT (raw, or as a JSON string) is decoded; a JSON object is
/// passed through unchanged.
fn parse_user_info(body: &str) -> FaydaResult<UserProfile> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(token)) => decode_payload(&token),
        Ok(Value::Object(claims)) => Ok(UserProfile::new(claims)),
        Ok(other) => Err(FaydaError::InvalidUserInfoResponse(format!(
            "expected a JWT or a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(_) => decode_payload(body),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
