use crate::cycle::TriggerOutcome;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hazardnexus_collectors::DEFAULT_RADIUS_M;
use hazardnexus_core::{InfrastructurePoi, WeatherSnapshot};
use serde::Deserialize;
use tracing::error;

// ============================================================================
// Status and triggers
// ============================================================================

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "HazardNexus online",
        "mode": "real-time direct feed",
        "sources": state.collectors.source_ids(),
        "collectBulletins": state.orchestrator.collects_bulletins(),
        "rendering": state.rendering,
        "model": state.classifier.model_name(),
        "cycle": state.orchestrator.controller().status(),
    }))
}

pub async fn trigger_collection(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.orchestrator.trigger();
    let code = match outcome {
        TriggerOutcome::Triggered => StatusCode::ACCEPTED,
        TriggerOutcome::AlreadyRunning => StatusCode::CONFLICT,
    };
    (
        code,
        Json(serde_json::json!({
            "status": outcome.as_str(),
            "cycle": state.orchestrator.controller().status(),
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics exporter not installed".to_string(),
        ),
    }
}

// ============================================================================
// Data endpoints
// ============================================================================

pub async fn get_data(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || store.load()).await {
        Ok(Ok(snapshot)) => match serde_json::to_value(snapshot) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => {
                error!("Failed to encode snapshot: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": e.to_string() })),
                )
            }
        },
        Ok(Err(e)) => {
            error!("Failed to load snapshot: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
        Err(e) => {
            error!("Snapshot load task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "snapshot unavailable" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InfrastructureQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius: Option<u32>,
}

pub async fn get_infrastructure(
    State(state): State<AppState>,
    Query(query): Query<InfrastructureQuery>,
) -> Json<Vec<InfrastructurePoi>> {
    let Some(poi) = &state.collectors.poi else {
        return Json(Vec::new());
    };
    let radius = query.radius.unwrap_or(DEFAULT_RADIUS_M);
    Json(poi.fetch_infrastructure(query.lat, query.lon, radius).await)
}

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lon: f64,
}

pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Json<Option<WeatherSnapshot>> {
    let Some(forecast) = &state.collectors.forecast else {
        return Json(None);
    };
    Json(forecast.fetch_weather(query.lat, query.lon).await)
}

// ============================================================================
// Risk predictions
// ============================================================================

pub async fn get_predictions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.classifier.predict_states())
}
