//! Nominatim geocoding client.
//!
//! Resolves free-text place names to coordinates via a Nominatim-compatible
//! search endpoint. The base URL is configurable so tests can point at a
//! local mock; the public instance requires an identifying User-Agent.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::errors::AppError;

/// A geocoded place.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Nominatim search result entry. lat/lon arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimEntry {
    display_name: String,
    lat: String,
    lon: String,
}

/// Client for a Nominatim-compatible geocoding service.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl GeocodeClient {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Geocode a free-text query, returning the top match.
    ///
    /// An empty result set is an upstream failure from the caller's
    /// perspective: the route endpoint cannot proceed without coordinates.
    pub async fn geocode(&self, query: &str) -> Result<GeocodedPlace, AppError> {
        let url = format!("{}/search", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| AppError::InternalError(format!("Invalid User-Agent: {}", e)))?,
        );

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query)])
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Geocoding request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Geocoding service returned HTTP {}",
                response.status()
            )));
        }

        let entries: Vec<NominatimEntry> = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Geocoding JSON parse error: {}", e))
        })?;

        let top = entries.into_iter().next().ok_or_else(|| {
            AppError::ExternalServiceError(format!("Location not found: {:?}", query))
        })?;

        let lat = top.lat.parse::<f64>();
        let lon = top.lon.parse::<f64>();
        let (Ok(lat), Ok(lon)) = (lat, lon) else {
            return Err(AppError::ExternalServiceError(format!(
                "Geocoding returned malformed coordinates for {:?}",
                query
            )));
        };

        Ok(GeocodedPlace {
            display_name: top.display_name,
            lat,
            lon,
        })
    }
}
