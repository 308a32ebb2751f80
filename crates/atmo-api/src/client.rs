// Vendor API HTTP client
//
// Wraps `reqwest::Client` with the vendor's OAuth2 token handling, error
// classification, and the one-shot re-authentication retry on expired
// tokens. Endpoint families (homes, stations, aircare) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use chrono::Utc;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::auth::{Credentials, TokenState};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Production API host.
pub const API_BASE_URL: &str = "https://api.netatmo.com";

/// OAuth2 token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Scope requested by the password grant: weather-station and
/// air-quality read access.
const AUTH_SCOPE: &str = "read_station read_homecoach";

/// Vendor error code carried on HTTP 401/403 when the access token has
/// expired. The only signature the request executor retries on.
const TOKEN_EXPIRED_CODE: i64 = 3;

/// Outcome of a single dispatch, before retry policy is applied.
///
/// `TokenExpired` is eligible for the one-shot re-authentication retry;
/// everywhere the retry is not taken it degrades into the
/// [`Error::RequestFailed`] the classification rules would have produced.
enum SendError {
    TokenExpired {
        path: String,
        message: String,
        status: u16,
    },
    Api(Error),
}

impl SendError {
    fn into_error(self) -> Error {
        match self {
            Self::TokenExpired {
                path,
                message,
                status,
            } => Error::RequestFailed {
                path,
                message,
                status: Some(status),
            },
            Self::Api(e) => e,
        }
    }
}

/// Async client for the vendor's weather/air-quality REST API.
///
/// Owns the token state (single source of truth for request
/// authorization) and the credential tuple. All endpoint methods require
/// a prior successful [`connect()`](Self::connect); the executor
/// re-authenticates transparently, exactly once, when the vendor reports
/// an expired token.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    token: Mutex<TokenState>,
}

impl ApiClient {
    /// Create a client against the production API host.
    pub fn new(credentials: Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(API_BASE_URL)?;
        Self::with_base_url(base_url, credentials, transport)
    }

    /// Create a client against an explicit base URL.
    ///
    /// Intended for tests and HTTP proxies; production callers should use
    /// [`new`](Self::new).
    pub fn with_base_url(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            token: Mutex::new(TokenState::default()),
        })
    }

    /// The configured API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A copy of the current token state.
    pub async fn token_state(&self) -> TokenState {
        self.token.lock().await.clone()
    }

    // ── Authentication ──────────────────────────────────────────────

    /// Establish a usable access token, trying the cheapest strategy
    /// first:
    ///
    /// 1. adopt a supplied non-empty token whose `expires_at` lies in the
    ///    future (stores the refresh token if given; no network call),
    /// 2. else run the refresh-token grant with the supplied or stored
    ///    refresh token,
    /// 3. else run the password grant with the full credential tuple.
    ///
    /// The fallback lets callers warm-start from a previously obtained
    /// token without re-authenticating.
    pub async fn connect(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        expires_at: i64,
    ) -> Result<(), Error> {
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            if expires_at > Utc::now().timestamp() {
                let mut state = self.token.lock().await;
                state.access_token = Some(token.to_owned());
                if let Some(refresh) = refresh_token.filter(|t| !t.is_empty()) {
                    state.refresh_token = Some(refresh.to_owned());
                }
                state.expires_at = expires_at;
                debug!("adopted externally supplied access token");
                return Ok(());
            }
        }

        let refresh = match refresh_token.filter(|t| !t.is_empty()) {
            Some(supplied) => Some(supplied.to_owned()),
            None => {
                let state = self.token.lock().await;
                state.refresh_token.clone().filter(|t| !t.is_empty())
            }
        };

        match refresh {
            Some(token) => self.authenticate_by_refresh_token(&token).await,
            None => self.authenticate_by_client_credentials().await,
        }
    }

    /// Exchange a refresh token for fresh token material.
    pub async fn authenticate_by_refresh_token(&self, refresh_token: &str) -> Result<(), Error> {
        if refresh_token.is_empty() {
            return Err(Error::MissingRefreshToken);
        }

        debug!("authenticating via refresh-token grant");
        let params = [
            ("grant_type", "refresh_token".to_owned()),
            ("client_id", self.credentials.client_id.clone()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret().to_owned(),
            ),
            ("refresh_token", refresh_token.to_owned()),
        ];

        let body = self.token_request(&params).await?;
        self.apply_token_response(&body).await
    }

    /// Authenticate with the full credential tuple.
    ///
    /// The vendor's token endpoint names this grant `password` and takes
    /// the user credentials alongside the client pair -- the string is
    /// preserved verbatim rather than mapped onto standard OAuth2 grant
    /// naming.
    pub async fn authenticate_by_client_credentials(&self) -> Result<(), Error> {
        debug!("authenticating via password grant");
        let params = [
            ("grant_type", "password".to_owned()),
            ("client_id", self.credentials.client_id.clone()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret().to_owned(),
            ),
            ("username", self.credentials.username.clone()),
            (
                "password",
                self.credentials.password.expose_secret().to_owned(),
            ),
            ("scope", AUTH_SCOPE.to_owned()),
        ];

        let body = self.token_request(&params).await?;
        self.apply_token_response(&body).await
    }

    /// POST the token endpoint. Authentication is invoked *by* the retry
    /// path, so it must never route back through [`request`](Self::request);
    /// the expired-token code cannot appear on this endpoint, making the
    /// classification identical either way.
    async fn token_request(&self, params: &[(&str, String)]) -> Result<Value, Error> {
        self.send(&Method::POST, TOKEN_PATH, params)
            .await
            .map_err(SendError::into_error)
    }

    /// Store a token-endpoint response, enforcing the shared
    /// token-setting rule: non-empty access and refresh tokens and a
    /// positive `expires_in`, else [`Error::InvalidToken`].
    async fn apply_token_response(&self, body: &Value) -> Result<(), Error> {
        let access = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());
        let refresh = body
            .get("refresh_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());
        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_i64)
            .filter(|secs| *secs > 0);

        let (Some(access), Some(refresh), Some(expires_in)) = (access, refresh, expires_in)
        else {
            return Err(Error::InvalidToken);
        };

        let mut state = self.token.lock().await;
        state.access_token = Some(access.to_owned());
        state.refresh_token = Some(refresh.to_owned());
        state.expires_at = Utc::now().timestamp() + expires_in;
        debug!(expires_in, "token material stored");
        Ok(())
    }

    // ── Request execution ───────────────────────────────────────────

    /// Issue an authenticated request and apply the retry policy: if the
    /// first attempt fails with the expired-token signature, clear the
    /// stored access token, force a reconnect, and re-issue the identical
    /// request exactly once. A second expiry propagates as a plain
    /// [`Error::RequestFailed`] -- the retry arm calls `send` directly,
    /// so rule 1 is structurally unreachable on the retry.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, Error> {
        match self.send(&method, path, params).await {
            Ok(body) => Ok(body),
            Err(SendError::TokenExpired { status, .. }) => {
                debug!(path, status, "access token expired -- re-authenticating once");
                let (refresh_token, expires_at) = {
                    let mut state = self.token.lock().await;
                    state.access_token = None;
                    (state.refresh_token.clone(), state.expires_at)
                };
                self.connect(None, refresh_token.as_deref(), expires_at)
                    .await?;
                self.send(&method, path, params)
                    .await
                    .map_err(SendError::into_error)
            }
            Err(e) => Err(e.into_error()),
        }
    }

    /// Dispatch a single request. GET parameters become the query string,
    /// POST bodies are form-urlencoded. Every path except the token
    /// endpoint requires a stored access token (local check) and carries
    /// it as a bearer Authorization header.
    async fn send(
        &self,
        method: &Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, SendError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SendError::Api(Error::InvalidUrl(e)))?;

        let mut builder = if *method == Method::GET {
            self.http.get(url).query(params)
        } else {
            self.http.post(url).form(params)
        };

        if path != TOKEN_PATH {
            let access_token = {
                let state = self.token.lock().await;
                state
                    .access_token
                    .clone()
                    .filter(|t| !t.is_empty())
                    .ok_or(SendError::Api(Error::MissingAccessToken))?
            };
            builder = builder.bearer_auth(access_token);
        }

        debug!(%method, path, "dispatching API request");
        let resp = builder.send().await.map_err(|e| {
            SendError::Api(Error::RequestFailed {
                path: path.to_owned(),
                message: e.to_string(),
                status: None,
            })
        })?;

        let status = resp.status();
        if status.is_success() {
            return resp.json::<Value>().await.map_err(|e| {
                SendError::Api(Error::RequestFailed {
                    path: path.to_owned(),
                    message: format!("invalid JSON body: {e}"),
                    status: Some(status.as_u16()),
                })
            });
        }

        let body = resp.text().await.unwrap_or_default();
        Err(classify_failure(path, status.as_u16(), &body))
    }
}

/// Classify a non-success response, in order:
///
/// 1. HTTP 401/403 carrying the vendor's expired-token code -> eligible
///    for the one-shot retry,
/// 2. `error_description` string,
/// 3. `error.message`,
/// 4. any other `error` value, JSON-serialized,
/// 5. unstructured body -> status line with a short preview.
fn classify_failure(path: &str, status: u16, body: &str) -> SendError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed.as_ref().and_then(extract_error_message).unwrap_or_else(|| {
        let preview: String = body.chars().take(200).collect();
        format!("HTTP {status}: {preview}")
    });

    let error_code = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("code"))
        .and_then(Value::as_i64);

    if (status == 401 || status == 403) && error_code == Some(TOKEN_EXPIRED_CODE) {
        return SendError::TokenExpired {
            path: path.to_owned(),
            message,
            status,
        };
    }

    SendError::Api(Error::RequestFailed {
        path: path.to_owned(),
        message,
        status: Some(status),
    })
}

fn extract_error_message(body: &Value) -> Option<String> {
    if let Some(desc) = body.get("error_description").and_then(Value::as_str) {
        return Some(desc.to_owned());
    }
    let error = body.get("error")?;
    if let Some(msg) = error.get("message").and_then(Value::as_str) {
        return Some(msg.to_owned());
    }
    Some(error.to_string())
}

/// Unwrap `body.<key>` from the vendor envelope. A missing key means the
/// vendor answered with an unexpected shape; reported through the
/// request-failure kind rather than a dedicated error.
pub(crate) fn unwrap_body_key(path: &str, response: &Value, key: &str) -> Result<Value, Error> {
    response
        .get("body")
        .and_then(|body| body.get(key))
        .cloned()
        .ok_or_else(|| Error::RequestFailed {
            path: path.to_owned(),
            message: format!("response body is missing `{key}`"),
            status: None,
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn expired_token_signature_requires_auth_status_and_code() {
        let body = r#"{"error":{"code":3,"message":"Access token expired"}}"#;
        assert!(matches!(
            classify_failure("/api/getstationsdata", 403, body),
            SendError::TokenExpired { status: 403, .. }
        ));
        assert!(matches!(
            classify_failure("/api/getstationsdata", 401, body),
            SendError::TokenExpired { status: 401, .. }
        ));
        // Same code on a non-auth status is a plain failure.
        assert!(matches!(
            classify_failure("/api/getstationsdata", 500, body),
            SendError::Api(Error::RequestFailed { .. })
        ));
        // Auth status with a different code is a plain failure.
        let other = r#"{"error":{"code":2,"message":"Invalid token"}}"#;
        assert!(matches!(
            classify_failure("/api/getstationsdata", 403, other),
            SendError::Api(Error::RequestFailed { .. })
        ));
    }

    #[test]
    fn message_extraction_prefers_error_description() {
        let body = r#"{"error_description":"invalid_grant","error":{"message":"nope"}}"#;
        let SendError::Api(Error::RequestFailed { message, .. }) =
            classify_failure("/oauth2/token", 400, body)
        else {
            panic!("expected RequestFailed");
        };
        assert_eq!(message, "invalid_grant");
    }

    #[test]
    fn bare_error_value_is_json_serialized() {
        let body = r#"{"error":"invalid_client"}"#;
        let SendError::Api(Error::RequestFailed { message, .. }) =
            classify_failure("/oauth2/token", 400, body)
        else {
            panic!("expected RequestFailed");
        };
        assert_eq!(message, "\"invalid_client\"");
    }

    #[test]
    fn unstructured_body_falls_back_to_status_line() {
        let SendError::Api(Error::RequestFailed {
            message,
            status: Some(502),
            ..
        }) = classify_failure("/api/getstationsdata", 502, "Bad Gateway")
        else {
            panic!("expected RequestFailed with status");
        };
        assert!(message.starts_with("HTTP 502"));
    }
}
