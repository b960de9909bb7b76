// Traffic Pulse API v0.1
use axum::http::{Method, StatusCode, Uri};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

mod catalog;
mod config;
mod errors;
mod routes;
mod services;

use catalog::LocationCatalog;
use config::AppConfig;
use routes::directions::DirectionsState;
use routes::predictions::PredictionState;
use services::geocode::GeocodeClient;
use services::oracle::ProcessOracle;
use services::routing::RoutingClient;

/// Traffic Pulse API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Traffic Pulse API",
        version = "0.1.0",
        description = "Traffic congestion prediction API for Bangalore road corridors. \
            Forwards categorical features (area, road, weather, roadwork) to an \
            out-of-process scoring model, classifies the raw score into a bounded \
            congestion level with severity, delay estimate and advisory, and proxies \
            geocoding and routing to external providers.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Locations", description = "Monitored areas and categorical options"),
        (name = "Predictions", description = "Single and bulk congestion forecasts"),
        (name = "Routes", description = "Geocoded route lookup"),
    ),
    paths(
        routes::health::health_check,
        routes::locations::list_locations,
        routes::predictions::predict_congestion,
        routes::predictions::predict_congestion_bulk,
        routes::directions::get_route,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::locations::LocationsResponse,
            catalog::CatalogEntry,
            services::prediction::PredictionBody,
            services::prediction::BulkEntry,
            services::classifier::Severity,
            routes::predictions::PredictionResponse,
            routes::predictions::PredictionPayload,
            routes::predictions::LocationEcho,
            routes::predictions::BulkPredictionResponse,
            routes::directions::RouteRequest,
            routes::directions::RouteResponse,
            routes::directions::RoutePayload,
            routes::directions::PlacePayload,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

/// Body of the 404 fallback response.
#[derive(Debug, Serialize, ToSchema)]
struct NotFoundResponse {
    error: String,
    path: String,
    method: String,
}

/// Fallback for unknown routes.
async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint not found".to_string(),
            path: uri.path().to_string(),
            method: method.to_string(),
        }),
    )
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traffic_pulse_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    errors::set_expose_error_details(config.is_development);

    // Static catalog, loaded once and shared read-only
    let location_catalog = Arc::new(LocationCatalog::bangalore());

    // Out-of-process scoring oracle
    let oracle = ProcessOracle::new(&config.oracle_command, &config.oracle_script);
    tracing::info!(
        "Scoring oracle: {} {}",
        config.oracle_command,
        config.oracle_script
    );

    let prediction_state = PredictionState {
        oracle: Arc::new(oracle),
    };

    let directions_state = DirectionsState {
        geocoder: GeocodeClient::new(&config.nominatim_base_url, &config.geocoder_user_agent),
        router: RoutingClient::new(&config.osrm_base_url),
    };

    // CORS — browser UI posts JSON prediction requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    // Build router
    // Each route group carries only the state it needs.
    let health_routes = Router::new().route("/api/health", get(routes::health::health_check));

    let location_routes = Router::new()
        .route("/api/locations", get(routes::locations::list_locations))
        .with_state(location_catalog);

    let prediction_routes = Router::new()
        .route("/api/predict", post(routes::predictions::predict_congestion))
        .route(
            "/api/predict/bulk",
            post(routes::predictions::predict_congestion_bulk),
        )
        .with_state(prediction_state);

    let direction_routes = Router::new()
        .route("/api/routes", post(routes::directions::get_route))
        .with_state(directions_state);

    let app = Router::new()
        .merge(health_routes)
        .merge(location_routes)
        .merge(prediction_routes)
        .merge(direction_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
