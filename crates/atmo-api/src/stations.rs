// Weather-station endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::client::{ApiClient, unwrap_body_key};
use crate::error::Error;
use crate::models::Station;

/// Parameters for [`ApiClient::get_measure`].
///
/// `device_id`, `scale`, and `measure_type` are required; the rest narrow
/// or shape the response. Defaults follow the vendor: `optimize` on,
/// `real_time` off.
#[derive(Debug, Clone)]
pub struct MeasureParams {
    pub device_id: String,
    pub module_id: Option<String>,
    /// Aggregation scale, e.g. `30min`, `1hour`, `1day`.
    pub scale: String,
    /// Comma-separated measurement types, e.g. `Temperature,Humidity`.
    pub measure_type: String,
    pub date_begin: Option<i64>,
    pub date_end: Option<i64>,
    pub limit: Option<u32>,
    pub optimize: bool,
    pub real_time: bool,
}

impl Default for MeasureParams {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            module_id: None,
            scale: String::new(),
            measure_type: String::new(),
            date_begin: None,
            date_end: None,
            limit: None,
            optimize: true,
            real_time: false,
        }
    }
}

impl MeasureParams {
    pub fn new(device_id: &str, scale: &str, measure_type: &str) -> Self {
        Self {
            device_id: device_id.to_owned(),
            scale: scale.to_owned(),
            measure_type: measure_type.to_owned(),
            ..Self::default()
        }
    }
}

impl ApiClient {
    /// Fetch station data for the whole account, or for one device when
    /// `device_id` is given. `get_favorites` includes favorited public
    /// stations.
    ///
    /// Returns the unwrapped `devices` list as typed stations.
    pub async fn get_stations_data(
        &self,
        device_id: Option<&str>,
        get_favorites: bool,
    ) -> Result<Vec<Station>, Error> {
        let path = "/api/getstationsdata";
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(id) = device_id.filter(|id| !id.is_empty()) {
            params.push(("device_id", id.to_owned()));
        }
        if get_favorites {
            params.push(("get_favorites", "true".to_owned()));
        }

        let body = self.request(Method::GET, path, &params).await?;
        let devices = unwrap_body_key(path, &body, "devices")?;
        serde_json::from_value(devices).map_err(|e| Error::RequestFailed {
            path: path.to_owned(),
            message: format!("unexpected device shape: {e}"),
            status: None,
        })
    }

    /// Fetch historical measurements for a device or module.
    ///
    /// Returns the unwrapped response body: the measurement series keyed
    /// the way the vendor sends it.
    pub async fn get_measure(&self, measure: &MeasureParams) -> Result<Value, Error> {
        if measure.device_id.is_empty() || measure.scale.is_empty() || measure.measure_type.is_empty()
        {
            return Err(Error::MissingMeasureParams);
        }

        let path = "/api/getmeasure";
        let mut params: Vec<(&str, String)> = vec![
            ("device_id", measure.device_id.clone()),
            ("scale", measure.scale.clone()),
            ("type", measure.measure_type.clone()),
            ("optimize", measure.optimize.to_string()),
            ("real_time", measure.real_time.to_string()),
        ];
        if let Some(ref module_id) = measure.module_id {
            params.push(("module_id", module_id.clone()));
        }
        if let Some(date_begin) = measure.date_begin {
            params.push(("date_begin", date_begin.to_string()));
        }
        if let Some(date_end) = measure.date_end {
            params.push(("date_end", date_end.to_string()));
        }
        if let Some(limit) = measure.limit {
            params.push(("limit", limit.to_string()));
        }

        let body = self.request(Method::GET, path, &params).await?;
        body.get("body")
            .cloned()
            .ok_or_else(|| Error::RequestFailed {
                path: path.to_owned(),
                message: "response body is missing `body`".into(),
                status: None,
            })
    }
}
