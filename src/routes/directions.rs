//! Route lookup endpoint.
//!
//! POST /api/routes — geocodes origin and destination, then fetches a
//! driving route from the selected routing provider.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::geocode::{GeocodeClient, GeocodedPlace};
use crate::services::routing::{RoutingClient, RoutingService};

/// Shared state for the route endpoint.
#[derive(Clone)]
pub struct DirectionsState {
    pub geocoder: GeocodeClient,
    pub router: RoutingClient,
}

/// Request body for POST /api/routes.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Free-text origin (e.g. "Hebbal, Bangalore")
    pub origin: Option<String>,
    /// Free-text destination
    pub destination: Option<String>,
    /// Routing provider; defaults to "osrm"
    pub routing_service: Option<String>,
}

/// A geocoded endpoint of the route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacePayload {
    /// The query as submitted
    pub name: String,
    /// Resolved display name from the geocoder
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl PlacePayload {
    fn new(query: &str, place: GeocodedPlace) -> Self {
        Self {
            name: query.to_string(),
            display_name: place.display_name,
            lat: place.lat,
            lon: place.lon,
        }
    }
}

/// The fetched route.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoutePayload {
    /// Total distance in metres
    pub distance: f64,
    /// Total duration in seconds
    pub duration: f64,
    /// GeoJSON LineString, suitable for direct map rendering
    #[schema(value_type = Object)]
    pub geometry: serde_json::Value,
}

/// Response for POST /api/routes.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub success: bool,
    pub route: RoutePayload,
    pub origin: PlacePayload,
    pub destination: PlacePayload,
    /// Provider that produced the route
    pub routing_service: &'static str,
}

/// Fetch a driving route between two free-text locations.
///
/// Both endpoints are geocoded first; a location the geocoder cannot
/// resolve fails the whole request (there is no partial route).
#[utoipa::path(
    post,
    path = "/api/routes",
    tag = "Routes",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Route between the two locations", body = RouteResponse),
        (status = 400, description = "Missing origin/destination or unknown provider", body = ErrorResponse),
        (status = 502, description = "Geocoding or routing provider failure", body = ErrorResponse),
    )
)]
pub async fn get_route(
    State(state): State<DirectionsState>,
    Json(body): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let (Some(origin_query), Some(destination_query)) =
        (non_blank(&body.origin), non_blank(&body.destination))
    else {
        return Err(AppError::BadRequest(
            "origin and destination are required".to_string(),
        ));
    };

    let service = RoutingService::parse(body.routing_service.as_deref())?;

    tracing::debug!(
        origin = %origin_query,
        destination = %destination_query,
        service = service.as_str(),
        "route request"
    );

    let (origin_place, destination_place) = tokio::try_join!(
        state.geocoder.geocode(&origin_query),
        state.geocoder.geocode(&destination_query),
    )?;

    let route = state
        .router
        .route(
            (origin_place.lat, origin_place.lon),
            (destination_place.lat, destination_place.lon),
        )
        .await?;

    Ok(Json(RouteResponse {
        success: true,
        route: RoutePayload {
            distance: route.distance_m,
            duration: route.duration_s,
            geometry: route.geometry,
        },
        origin: PlacePayload::new(&origin_query, origin_place),
        destination: PlacePayload::new(&destination_query, destination_place),
        routing_service: service.as_str(),
    }))
}
