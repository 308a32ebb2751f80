// Home topology endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::client::{ApiClient, unwrap_body_key};
use crate::error::Error;

impl ApiClient {
    /// Fetch the account's home topology. `gateway_types` optionally
    /// narrows the response to specific device families.
    ///
    /// Returns the unwrapped `homes` list.
    pub async fn get_homes_data(
        &self,
        home_id: Option<&str>,
        gateway_types: &[&str],
    ) -> Result<Value, Error> {
        let path = "/api/homesdata";
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(id) = home_id.filter(|id| !id.is_empty()) {
            params.push(("home_id", id.to_owned()));
        }
        for gateway_type in gateway_types {
            params.push(("gateway_types", (*gateway_type).to_owned()));
        }

        let body = self.request(Method::GET, path, &params).await?;
        unwrap_body_key(path, &body, "homes")
    }

    /// Fetch the live status of one home.
    ///
    /// Returns the unwrapped `home` object.
    pub async fn get_home_status(
        &self,
        home_id: &str,
        gateway_types: &[&str],
    ) -> Result<Value, Error> {
        if home_id.is_empty() {
            return Err(Error::MissingHomeId);
        }

        let path = "/api/homestatus";
        let mut params: Vec<(&str, String)> = vec![("home_id", home_id.to_owned())];
        for gateway_type in gateway_types {
            params.push(("gateway_types", (*gateway_type).to_owned()));
        }

        let body = self.request(Method::GET, path, &params).await?;
        unwrap_body_key(path, &body, "home")
    }
}
