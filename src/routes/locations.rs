use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::catalog::{CatalogEntry, LocationCatalog, RoadworkActivity, WeatherCondition};

/// Response for GET /api/locations.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationsResponse {
    pub success: bool,
    /// Monitored areas with their roads, in display order
    pub locations: Vec<CatalogEntry>,
    /// Valid weatherConditions values
    pub weather_options: Vec<&'static str>,
    /// Valid roadworkActivity values
    pub roadwork_options: Vec<&'static str>,
}

/// List the monitored areas, roads and categorical options.
///
/// Backed by the static catalog loaded at startup; never changes at runtime.
#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    responses(
        (status = 200, description = "Available locations and options", body = LocationsResponse),
    )
)]
pub async fn list_locations(
    State(catalog): State<Arc<LocationCatalog>>,
) -> Json<LocationsResponse> {
    Json(LocationsResponse {
        success: true,
        locations: catalog.entries().to_vec(),
        weather_options: WeatherCondition::ALL.iter().map(|w| w.as_str()).collect(),
        roadwork_options: RoadworkActivity::ALL.iter().map(|r| r.as_str()).collect(),
    })
}
