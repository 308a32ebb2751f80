// Telemetry normalization
//
// Converts the vendor's nested, inconsistently-cased measurement payloads
// into flat renamed records. Copying is driven by key presence, never by
// value truthiness -- an explicit 0 or false is data.

use serde_json::Value;
use tracing::warn;

use atmo_api::models::{AircareDevice, Station, StationModule};

use crate::record::Frame;

/// Vendor measurement field -> flat record key. The only fields the
/// bridge copies; anything else in `dashboard_data` is ignored. Renames
/// (including the `windstrenghtmax` spelling) match the topics consumers
/// already subscribe to.
const MEASURE_FIELDS: &[(&str, &str)] = &[
    ("Temperature", "temperature"),
    ("temp_trend", "temptrend"),
    ("Pressure", "pressure"),
    ("AbsolutePressure", "pressureabs"),
    ("pressure_trend", "pressuretrend"),
    ("Humidity", "humidity"),
    ("CO2", "co2"),
    ("Noise", "noise"),
    ("Rain", "rain"),
    ("sum_rain_1", "sumrain1"),
    ("sum_rain_24", "sumrain24"),
    ("WindStrength", "windstrength"),
    ("WindAngle", "windangle"),
    ("GustStrength", "guststrength"),
    ("GustAngle", "gustangle"),
    ("health_idx", "healthidx"),
    ("min_temp", "mintemp"),
    ("max_temp", "maxtemp"),
    ("date_min_temp", "mintemputc"),
    ("date_max_temp", "maxtemputc"),
    ("max_wind_str", "windstrenghtmax"),
    ("max_wind_angle", "windanglemax"),
    ("date_max_wind_str", "windmaxutc"),
    ("time_utc", "timeutc"),
];

/// Flatten one raw measurement object through the rename table.
///
/// Only keys present in the source appear in the output; absent source
/// fields produce absent output keys, never null/zero defaults.
pub fn process_measure(raw: &Value) -> Frame {
    let mut frame = Frame::new();
    let Some(object) = raw.as_object() else {
        return frame;
    };
    for (source, dest) in MEASURE_FIELDS {
        if let Some(value) = object.get(*source) {
            frame.insert(dest, value.clone());
        }
    }
    frame
}

fn online_flag(reachable: Option<bool>) -> i64 {
    i64::from(reachable.unwrap_or(false))
}

/// Normalize a station and its modules into one record per physical
/// device. A station with no modules still yields its own record, with a
/// warning -- modules missing from the payload usually mean a radio
/// outage worth noticing.
pub fn process_station(station: &Station) -> Vec<Frame> {
    let mut frame = station
        .dashboard_data
        .as_ref()
        .map(process_measure)
        .unwrap_or_default();
    frame.insert("id", station.id.as_str());
    frame.insert_opt("name", station.station_name.clone());
    frame.insert_opt("type", station.station_type.clone());
    frame.insert_opt("home", station.home_name.clone());
    frame.insert("online", online_flag(station.reachable));
    frame.insert_opt("wifistatus", station.wifi_status);

    let mut frames = vec![frame];

    if station.modules.is_empty() {
        warn!(
            station = station.station_name.as_deref().unwrap_or(&station.id),
            "station has no modules"
        );
        return frames;
    }

    for module in &station.modules {
        frames.push(process_module(module, station.home_name.as_deref()));
    }
    frames
}

fn process_module(module: &StationModule, home_name: Option<&str>) -> Frame {
    let mut frame = module
        .dashboard_data
        .as_ref()
        .map(process_measure)
        .unwrap_or_default();
    frame.insert("id", module.id.as_str());
    frame.insert_opt("name", module.module_name.clone());
    frame.insert_opt("type", module.module_type.clone());
    frame.insert_opt("home", home_name.map(str::to_owned));
    frame.insert("online", online_flag(module.reachable));
    frame.insert_opt("rfstatus", module.rf_status);
    frame.insert_opt("battery", module.battery_percent);
    frame
}

/// Normalize a standalone air-quality monitor into one record.
pub fn process_aircare(device: &AircareDevice) -> Frame {
    let mut frame = device
        .dashboard_data
        .as_ref()
        .map(process_measure)
        .unwrap_or_default();
    frame.insert("id", device.id.as_str());
    frame.insert_opt("name", device.station_name.clone());
    frame.insert_opt("type", device.device_type.clone());
    frame.insert_opt("module", device.module_name.clone());
    frame.insert("online", online_flag(device.reachable));
    frame.insert_opt("wifistatus", device.wifi_status);
    frame
}
