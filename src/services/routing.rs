//! OSRM routing client.
//!
//! Fetches a driving route between two coordinate pairs from an
//! OSRM-compatible `/route/v1` endpoint. Coordinates are ordered lon,lat on
//! the wire (OSRM convention). The provider is selectable per request but
//! only "osrm" is implemented; unknown providers are rejected upfront.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;

/// Supported routing providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingService {
    Osrm,
}

impl RoutingService {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingService::Osrm => "osrm",
        }
    }

    /// Parse the `routingService` request field. `None` selects the default.
    pub fn parse(s: Option<&str>) -> Result<Self, AppError> {
        match s {
            None | Some("osrm") => Ok(RoutingService::Osrm),
            Some(other) => Err(AppError::BadRequest(format!(
                "Unsupported routingService {:?}; expected \"osrm\"",
                other
            ))),
        }
    }
}

/// A fetched route.
#[derive(Debug, Clone)]
pub struct Route {
    /// Total distance in metres
    pub distance_m: f64,
    /// Total duration in seconds
    pub duration_s: f64,
    /// GeoJSON LineString geometry, passed through to the client untouched
    pub geometry: Value,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Value,
}

/// Client for an OSRM-compatible routing service.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    client: reqwest::Client,
    base_url: String,
}

impl RoutingClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the best route between two points.
    pub async fn route(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
    ) -> Result<Route, AppError> {
        let (origin_lat, origin_lon) = origin;
        let (dest_lat, dest_lon) = destination;

        let url = format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.base_url, origin_lon, origin_lat, dest_lon, dest_lat
        );

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Routing request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Routing service returned HTTP {}",
                response.status()
            )));
        }

        let body: OsrmResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Routing JSON parse error: {}", e))
        })?;

        if body.code != "Ok" {
            return Err(AppError::ExternalServiceError(format!(
                "Routing service returned code {:?}",
                body.code
            )));
        }

        let best = body.routes.into_iter().next().ok_or_else(|| {
            AppError::ExternalServiceError("Routing service returned no routes".to_string())
        })?;

        Ok(Route {
            distance_m: best.distance,
            duration_s: best.duration,
            geometry: best.geometry,
        })
    }
}
