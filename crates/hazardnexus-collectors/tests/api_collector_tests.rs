//! Feed, infrastructure, and forecast collectors against a mock upstream

use hazardnexus_collectors::{FeedCollector, FetchParams, ForecastCollector, PoiCollector, SourceCollector};
use hazardnexus_core::{BoundingBox, Payload, PoiCategory, RiskLevel};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_BODY: &str = r#"{"features": [
    {"geometry": {"coordinates": [77.2, 28.6]},
     "properties": {"eventtype": "FL", "name": "Flood in Delhi", "alertlevel": "Red"}},
    {"geometry": {"coordinates": [98.0001, 20.0]},
     "properties": {"eventtype": "TC", "name": "Cyclone offshore", "alertlevel": "Orange"}},
    {"geometry": {"coordinates": [98.0, 37.0]},
     "properties": {"eventtype": "EQ", "name": "Corner", "alertlevel": "Green"}}
]}"#;

#[tokio::test]
async fn test_feed_filters_to_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("eventlist", "EQ,TC,FL,DR"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let collector =
        FeedCollector::new(format!("{}/events?eventlist=EQ,TC,FL,DR", server.uri())).unwrap();
    let alerts = collector.fetch_alerts().await;

    let names: Vec<_> = alerts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Flood in Delhi", "Corner"]);
}

#[tokio::test]
async fn test_feed_custom_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_BODY))
        .mount(&server)
        .await;

    let region = BoundingBox {
        lat_min: 25.0,
        lat_max: 30.0,
        lon_min: 75.0,
        lon_max: 80.0,
    };
    let collector = FeedCollector::new(server.uri()).unwrap().with_region(region);
    let record = collector.fetch(&FetchParams::none()).await.unwrap();

    match record.payload {
        Payload::HazardEvents(events) => assert_eq!(events.len(), 1),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn test_feed_errors_degrade_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
        .mount(&server)
        .await;

    let down = FeedCollector::new(format!("{}/down", server.uri())).unwrap();
    assert!(down.fetch_alerts().await.is_empty());
    assert!(down.fetch_events().await.unwrap_err().is_network());

    let garbage = FeedCollector::new(format!("{}/garbage", server.uri())).unwrap();
    assert!(garbage.fetch_alerts().await.is_empty());
    assert!(!garbage.fetch_events().await.unwrap_err().is_network());
}

#[tokio::test]
async fn test_poi_posts_query_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .and(body_string_contains("data="))
        .and(body_string_contains("around%3A1500%2C28.61%2C77.2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"elements": [{"lat": 28.6, "lon": 77.21, "tags": {"amenity": "police", "name": "Thana"}}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let collector = PoiCollector::new(format!("{}/api/interpreter", server.uri())).unwrap();
    let points = collector.fetch_infrastructure(28.61, 77.2, 1500).await;

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].category, PoiCategory::Police);
    assert_eq!(points[0].name, "Thana");
}

#[tokio::test]
async fn test_poi_failure_is_empty_and_location_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let collector = PoiCollector::new(server.uri()).unwrap();
    assert!(collector.fetch_infrastructure(0.0, 0.0, 5000).await.is_empty());
    assert!(collector.fetch(&FetchParams::none()).await.is_err());
}

#[tokio::test]
async fn test_forecast_request_and_risk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "22.57"))
        .and(query_param("longitude", "88.36"))
        .and(query_param("hourly", "visibility"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"current": {"time": "2024-07-01T10:00", "temperature_2m": 29.0,
                "relative_humidity_2m": 88, "precipitation": 51.0,
                "wind_speed_10m": 20.0, "soil_moisture_0_to_1cm": 0.41}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let collector = ForecastCollector::new(format!("{}/v1/forecast", server.uri())).unwrap();
    let weather = collector.fetch_weather(22.57, 88.36).await.unwrap();

    assert_eq!(weather.risk_level, RiskLevel::High);
    assert_eq!(weather.soil_moisture, Some(0.41));
    assert_eq!(weather.humidity, Some(88.0));
}

#[tokio::test]
async fn test_forecast_failure_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let collector = ForecastCollector::new(server.uri()).unwrap();
    assert!(collector.fetch_weather(28.61, 77.2).await.is_none());

    let record = collector.collect(&FetchParams::at(28.61, 77.2)).await;
    assert!(record.is_error());
}

#[tokio::test]
async fn test_failed_feed_and_poi_collect_as_empty_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let feed = FeedCollector::new(server.uri()).unwrap();
    let record = feed.collect(&FetchParams::none()).await;
    assert!(!record.is_error());
    assert_eq!(record.payload, Payload::HazardEvents(Vec::new()));

    let poi = PoiCollector::new(server.uri()).unwrap();
    let record = poi.collect(&FetchParams::at(28.61, 77.2)).await;
    assert!(!record.is_error());
    assert_eq!(record.payload, Payload::Infrastructure(Vec::new()));
}
