#![allow(clippy::unwrap_used)]
// End-to-end poll pass tests: wiremock vendor API + a recording sink.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atmo_api::{ApiClient, Credentials, TransportConfig};
use atmo_core::{CoreError, Frame, FrameSink, Poller};

// ── Recording sink ──────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingSink {
    async fn frames(&self) -> Vec<Frame> {
        self.frames.lock().await.clone()
    }
}

impl FrameSink for RecordingSink {
    async fn emit(&self, frame: Frame) -> Result<(), CoreError> {
        self.frames.lock().await.push(frame);
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn client_for(server: &MockServer) -> Arc<ApiClient> {
    let base_url = Url::parse(&server.uri()).unwrap();
    let credentials =
        Credentials::new("client-id", "client-secret", "user@example.com", "hunter2").unwrap();
    Arc::new(ApiClient::with_base_url(base_url, credentials, &TransportConfig::default()).unwrap())
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 10_800
        })))
        .mount(server)
        .await;
}

async fn mount_stations(server: &MockServer, devices: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/getstationsdata"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "body": { "devices": devices } })),
        )
        .mount(server)
        .await;
}

async fn mount_aircare(server: &MockServer, devices: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/gethomecoachsdata"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "body": { "devices": devices } })),
        )
        .mount(server)
        .await;
}

fn station_with_outdoor_module() -> serde_json::Value {
    json!([{
        "_id": "70:ee:50:3f:9a:aa",
        "station_name": "Casa",
        "type": "NAMain",
        "home_name": "Casa",
        "reachable": true,
        "wifi_status": 40,
        "modules": [{
            "_id": "02:00:00:3f:9a:aa",
            "module_name": "Outdoor",
            "type": "NAModule1",
            "reachable": true,
            "rf_status": 68,
            "battery_percent": 77,
            "dashboard_data": { "Temperature": 12.4, "Humidity": 81 }
        }],
        "dashboard_data": { "Temperature": 21.3, "CO2": 612 }
    }])
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn poll_pass_emits_one_record_per_physical_device() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    mount_stations(&server, station_with_outdoor_module()).await;
    mount_aircare(
        &server,
        json!([{
            "_id": "70:ee:50:22:a3:00",
            "station_name": "Bedroom",
            "module_name": "string",
            "type": "NHC",
            "reachable": true,
            "wifi_status": 22,
            "dashboard_data": { "Temperature": 23.7, "CO2": 967 }
        }]),
    )
    .await;

    let client = client_for(&server);
    client.connect(None, None, 0).await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::new(client, Arc::clone(&sink));
    poller.poll_data().await.unwrap();

    let frames = sink.frames().await;
    assert_eq!(frames.len(), 3, "station + module + aircare");

    assert_eq!(frames[0].id(), Some("70:ee:50:3f:9a:aa"));
    assert_eq!(frames[0].get("wifistatus"), Some(&json!(40)));
    assert_eq!(frames[0].get("co2"), Some(&json!(612)));

    assert_eq!(frames[1].id(), Some("02:00:00:3f:9a:aa"));
    assert_eq!(frames[1].get("battery"), Some(&json!(77)));
    assert_eq!(frames[1].get("home"), Some(&json!("Casa")));

    assert_eq!(frames[2].id(), Some("70:ee:50:22:a3:00"));
    assert_eq!(frames[2].get("module"), Some(&json!("string")));
    assert_eq!(frames[2].get("temperature"), Some(&json!(23.7)));
}

#[tokio::test]
async fn poll_pass_surfaces_api_failures() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/getstationsdata"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.connect(None, None, 0).await.unwrap();

    let poller = Poller::new(client, Arc::new(RecordingSink::default()));
    let result = poller.poll_data().await;
    assert!(
        matches!(result, Err(CoreError::Api(_))),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn start_polling_authenticates_and_runs_immediate_pass() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    mount_stations(&server, station_with_outdoor_module()).await;
    mount_aircare(&server, json!([])).await;

    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::new(client_for(&server), Arc::clone(&sink))
        .with_interval(Duration::from_secs(3600));

    let handle = poller.start_polling().await.unwrap();

    // The first tick fires immediately; give it a moment to complete.
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.stop().await;

    let frames = sink.frames().await;
    assert_eq!(frames.len(), 2, "station + module from the immediate pass");
}

#[tokio::test]
async fn start_polling_fails_fast_on_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "bad client secret"
        })))
        .mount(&server)
        .await;

    let poller = Poller::new(client_for(&server), Arc::new(RecordingSink::default()));
    let result = poller.start_polling().await;
    assert!(
        matches!(result, Err(CoreError::Api(_))),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn tick_failure_keeps_schedule_alive() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    // Stations always fail; aircare never reached.
    Mock::given(method("GET"))
        .and(path("/api/getstationsdata"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2..)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let poller = Poller::new(client_for(&server), Arc::clone(&sink))
        .with_interval(Duration::from_millis(50));

    let handle = poller.start_polling().await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.stop().await;

    // The schedule survived multiple failing ticks (mock expectation
    // verifies >= 2 hits on drop) and nothing was emitted.
    assert!(sink.frames().await.is_empty());
}
