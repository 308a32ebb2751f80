// Credential and token-state types.
//
// Credentials are validated once, at construction; the client never has to
// re-check them at poll time. TokenState is the single source of truth for
// request authorization and is mutated only by the authenticator.

use chrono::Utc;
use secrecy::SecretString;

use crate::error::Error;

/// Immutable credential tuple for the vendor's OAuth2 token endpoint.
///
/// Client id/secret are required for any grant; username/password are
/// required for the password grant. Incomplete tuples fail construction
/// immediately with [`Error::Configuration`].
#[derive(Debug, Clone)]
pub struct Credentials {
    pub(crate) client_id: String,
    pub(crate) client_secret: SecretString,
    pub(crate) username: String,
    pub(crate) password: SecretString,
}

impl Credentials {
    /// Validate and build a credential tuple. Empty strings count as
    /// missing.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, Error> {
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(Error::Configuration {
                message: "client id and client secret are required".into(),
            });
        }
        if username.is_empty() || password.is_empty() {
            return Err(Error::Configuration {
                message: "username and password are required".into(),
            });
        }
        Ok(Self {
            client_id: client_id.to_owned(),
            client_secret: SecretString::from(client_secret.to_owned()),
            username: username.to_owned(),
            password: SecretString::from(password.to_owned()),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// Bearer/refresh token pair plus expiry, owned by the client.
///
/// Created empty at client construction; overwritten by any successful
/// authentication. The request executor clears `access_token` (never the
/// refresh token) when the vendor signals expiry, forcing the next
/// `connect` to refresh.
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Epoch seconds. Zero means "never authenticated".
    pub expires_at: i64,
}

impl TokenState {
    /// A token is valid iff it is non-empty and not yet expired.
    pub fn is_valid(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.expires_at > Utc::now().timestamp()
    }
}
