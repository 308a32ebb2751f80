//! Async client for the Netatmo weather and air-quality cloud API.
//!
//! [`ApiClient`] owns the OAuth2 token state and re-authenticates
//! transparently (exactly once per logical call) when the vendor reports
//! an expired access token. Endpoint families live in their own modules
//! as inherent methods.

pub mod aircare;
pub mod auth;
pub mod client;
pub mod error;
pub mod homes;
pub mod models;
pub mod stations;
pub mod transport;

pub use auth::{Credentials, TokenState};
pub use client::{API_BASE_URL, ApiClient, TOKEN_PATH};
pub use error::Error;
pub use models::{AircareDevice, Station, StationModule};
pub use stations::MeasureParams;
pub use transport::TransportConfig;
