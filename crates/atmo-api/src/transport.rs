// Transport configuration for building reqwest::Client instances.
//
// The vendor API sits behind a public CA, so there are no TLS knobs here;
// the config exists to bound request time and pin the user agent.

use std::time::Duration;

use crate::error::Error;

/// Transport settings shared by every request the client issues.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. A stuck call must not stall the poll
    /// schedule indefinitely.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("atmo2mqtt/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(Error::Transport)
    }
}
