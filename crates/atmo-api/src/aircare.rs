// Air-quality monitor endpoints.

use reqwest::Method;

use crate::client::{ApiClient, unwrap_body_key};
use crate::error::Error;
use crate::models::AircareDevice;

impl ApiClient {
    /// Fetch air-quality monitors for the whole account, or one device
    /// when `device_id` is given.
    ///
    /// Returns the unwrapped `devices` list as typed monitors.
    pub async fn get_home_coach_data(
        &self,
        device_id: Option<&str>,
    ) -> Result<Vec<AircareDevice>, Error> {
        let path = "/api/gethomecoachsdata";
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(id) = device_id.filter(|id| !id.is_empty()) {
            params.push(("device_id", id.to_owned()));
        }

        let body = self.request(Method::GET, path, &params).await?;
        let devices = unwrap_body_key(path, &body, "devices")?;
        serde_json::from_value(devices).map_err(|e| Error::RequestFailed {
            path: path.to_owned(),
            message: format!("unexpected device shape: {e}"),
            status: None,
        })
    }
}
