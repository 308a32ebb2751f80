// Device payload models.
//
// Only the identity/status fields the bridge merges into records are
// typed; `dashboard_data` stays a raw JSON value because the measurement
// set is open and varies per device family.

use serde::Deserialize;
use serde_json::Value;

/// A main weather station, optionally carrying attached wireless modules.
#[derive(Debug, Clone, Deserialize)]
pub struct Station {
    #[serde(rename = "_id")]
    pub id: String,
    pub station_name: Option<String>,
    #[serde(rename = "type")]
    pub station_type: Option<String>,
    pub home_name: Option<String>,
    pub reachable: Option<bool>,
    pub wifi_status: Option<i64>,
    #[serde(default)]
    pub modules: Vec<StationModule>,
    pub dashboard_data: Option<Value>,
}

/// A satellite sensor unit bound to a station over a radio link.
#[derive(Debug, Clone, Deserialize)]
pub struct StationModule {
    #[serde(rename = "_id")]
    pub id: String,
    pub module_name: Option<String>,
    #[serde(rename = "type")]
    pub module_type: Option<String>,
    pub reachable: Option<bool>,
    pub rf_status: Option<i64>,
    pub battery_percent: Option<i64>,
    pub dashboard_data: Option<Value>,
}

/// A standalone indoor air-quality monitor (not station-attached).
#[derive(Debug, Clone, Deserialize)]
pub struct AircareDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub station_name: Option<String>,
    pub module_name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub reachable: Option<bool>,
    pub wifi_status: Option<i64>,
    pub dashboard_data: Option<Value>,
}
