use thiserror::Error;

/// Top-level error type for the `atmo-api` crate.
///
/// Covers every failure mode across the client: credential validation,
/// authentication, local precondition checks, and HTTP request execution.
/// `atmo-core` wraps these for the poll loop.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Credentials were incomplete at construction time. Fatal -- the
    /// client cannot be built without a full credential tuple.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    // ── Local preconditions ─────────────────────────────────────────
    /// A non-token endpoint was called before any successful
    /// authentication. Checked locally, never a network round trip.
    #[error("no access token available -- call connect() first")]
    MissingAccessToken,

    /// The refresh-token grant was requested without a refresh token.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// `get_home_status` requires a home id.
    #[error("home id is required")]
    MissingHomeId,

    /// `get_measure` requires device id, scale, and measure type.
    #[error("device id, scale, and measure type are required")]
    MissingMeasureParams,

    // ── Authentication ──────────────────────────────────────────────
    /// The token endpoint answered without usable token material
    /// (empty access/refresh token or non-positive expiry).
    #[error("authentication response is missing token material")]
    InvalidToken,

    // ── Requests ────────────────────────────────────────────────────
    /// An HTTP request failed after the retry logic has run its course.
    /// `status` is absent for transport-level failures (timeout,
    /// connection refused) that produced no structured response.
    #[error("request to {path} failed: {message}")]
    RequestFailed {
        path: String,
        message: String,
        status: Option<u16>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// Failed to build the underlying HTTP client.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error is a local precondition violation --
    /// a caller bug that retrying cannot fix.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingAccessToken
                | Self::MissingRefreshToken
                | Self::MissingHomeId
                | Self::MissingMeasureParams
        )
    }

    /// The HTTP status attached to a failed request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
