use crate::cycle::{schedule_collection, PeriodicTimer, TokioIntervalTimer};
use crate::server::routes;
use crate::state::AppState;
use axum::{http::HeaderValue, routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Build the Axum application
pub fn build_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        .route("/data", get(routes::get_data))
        .route("/infrastructure", get(routes::get_infrastructure))
        .route("/weather", get(routes::get_weather))
        .route("/ml-prediction", get(routes::get_predictions));

    let assets = ServeDir::new(&state.config.storage.asset_root);

    Router::new()
        .route("/", get(routes::status))
        .route(
            "/collect",
            get(routes::trigger_collection).post(routes::trigger_collection),
        )
        .route("/metrics", get(routes::metrics))
        .nest("/api", api_routes)
        .nest_service("/assets", assets)
        .layer(cors)
        .with_state(state)
}

/// Run the server with background collection until `shutdown` resolves
pub async fn run_server(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr: SocketAddr = state.config.server.address().parse()?;
    let collection = state.config.collection.clone();
    let orchestrator = state.orchestrator.clone();

    let timer = TokioIntervalTimer::new();
    schedule_collection(&timer, orchestrator.clone(), collection.interval());

    if collection.run_on_start {
        info!("Running initial collection");
        orchestrator.trigger();
    }

    let app = build_app(state);

    info!("Starting HazardNexus on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    timer.stop();
    info!("Server shutdown complete");
    Ok(())
}
