//! HTTP API against in-process state

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{state, FORECAST_BODY};
use hazardnexus_collectors::{CollectorSet, ForecastCollector, PoiCollector};
use hazardnexus_core::{HazardEvent, Severity, Snapshot};
use hazardnexus_server::build_app;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_status_page() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let (status, json) = get_json(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "HazardNexus online");
    assert_eq!(json["model"], "random-forest");
    assert_eq!(json["cycle"]["busy"], false);
    assert_eq!(json["cycle"]["cyclesCompleted"], 0);
}

#[tokio::test]
async fn test_data_before_first_cycle_is_empty() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let (status, json) = get_json(app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["alerts"], serde_json::json!([]));
    assert_eq!(json["keyMetrics"], serde_json::json!({}));
    assert_eq!(json["lastUpdated"], 0);
    assert!(json.get("bulletins").is_none());
}

#[tokio::test]
async fn test_data_serves_persisted_snapshot() {
    let dir = TempDir::new().unwrap();
    let app_state = state(&dir, CollectorSet::default());

    let mut snapshot = Snapshot {
        last_updated: 1_720_000_000,
        ..Default::default()
    };
    snapshot.alerts.push(HazardEvent {
        event_type: "TC".to_string(),
        name: "Cyclone Remal".to_string(),
        description: String::new(),
        severity: Severity::Red,
        lat: 21.0,
        lon: 89.0,
        observed_at: None,
        source_country_code: Some("IND".to_string()),
        episode_id: None,
    });
    app_state.store.save(&snapshot).unwrap();

    let (status, json) = get_json(build_app(app_state), "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["lastUpdated"], 1_720_000_000);
    assert_eq!(json["alerts"][0]["name"], "Cyclone Remal");
}

#[tokio::test]
async fn test_corrupt_store_is_server_error() {
    let dir = TempDir::new().unwrap();
    let app_state = state(&dir, CollectorSet::default());
    std::fs::write(app_state.store.path(), "{not json").unwrap();

    let (status, json) = get_json(build_app(app_state), "/api/data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_predictions_cover_reference_states_in_order() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let (status, json) = get_json(app, "/api/ml-prediction").await;
    assert_eq!(status, StatusCode::OK);

    let results = json.as_array().unwrap();
    let states: Vec<&str> = results
        .iter()
        .map(|r| r["state"].as_str().unwrap())
        .collect();
    assert_eq!(
        states,
        vec![
            "Tamil Nadu",
            "Assam",
            "Uttarakhand",
            "Gujarat",
            "Maharashtra",
            "Kerala",
            "Delhi",
            "Odisha"
        ]
    );
    for result in results {
        let safety = result["safetyScore"].as_u64().unwrap();
        let confidence = result["confidence"].as_u64().unwrap();
        assert!(safety <= 100 && confidence <= 100);
        assert!(confidence >= safety);
    }
}

#[tokio::test]
async fn test_weather_without_collector_is_null() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let (status, json) = get_json(app, "/api/weather?lat=28.61&lon=77.2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_null());
}

#[tokio::test]
async fn test_weather_and_infrastructure_proxy_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "19.07"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_BODY))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/overpass"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"elements": [{"type": "node", "lat": 19.0, "lon": 72.8,
                "tags": {"amenity": "hospital", "name": "KEM Hospital"}}]}"#,
        ))
        .mount(&server)
        .await;

    let collectors = CollectorSet {
        forecast: Some(Arc::new(
            ForecastCollector::new(format!("{}/forecast", server.uri())).unwrap(),
        )),
        poi: Some(Arc::new(
            PoiCollector::new(format!("{}/overpass", server.uri())).unwrap(),
        )),
        ..Default::default()
    };
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, collectors));

    let (status, weather) = get_json(app.clone(), "/api/weather?lat=19.07&lon=72.87").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weather["precipMm"], 12.5);
    assert_eq!(weather["riskLevel"], "Low");

    let (status, pois) = get_json(app, "/api/infrastructure?lat=19.07&lon=72.87&radius=2000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pois[0]["name"], "KEM Hospital");
    assert_eq!(pois[0]["category"], "hospital");

}

#[tokio::test]
async fn test_infrastructure_without_collector_is_empty() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let (status, json) = get_json(app, "/api/infrastructure?lat=19.07&lon=72.87").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_collect_trigger_is_accepted() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/collect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "triggered");
}

#[tokio::test]
async fn test_metrics_without_exporter_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = build_app(state(&dir, CollectorSet::default()));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assets_are_served() {
    let dir = TempDir::new().unwrap();
    let app_state = state(&dir, CollectorSet::default());
    let images = app_state.config.storage.image_dir.clone();
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("satellite_live.jpg"), b"jpeg").unwrap();

    let response = build_app(app_state)
        .oneshot(
            Request::builder()
                .uri("/assets/images/satellite_live.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"jpeg");
}
