//! Prediction HTTP endpoints.
//!
//! - POST /api/predict — single-location forecast
//! - POST /api/predict/bulk — ordered batch with per-item failure isolation

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::classifier::Severity;
use crate::services::oracle::ScoringOracle;
use crate::services::prediction::{
    predict, predict_bulk, BulkEntry, PredictionBody, PredictionRequest,
};

/// Shared state for prediction endpoints.
#[derive(Clone)]
pub struct PredictionState {
    pub oracle: Arc<dyn ScoringOracle>,
}

/// Submitted location, echoed back inside a prediction.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationEcho {
    pub area: String,
    pub road: String,
    pub weather: &'static str,
    pub roadwork: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_date: Option<String>,
}

/// Classified forecast for one location.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    /// Clamped congestion percentage, 0-100
    pub congestion_level: u8,
    pub severity: Severity,
    /// Fixed delay bucket (e.g. "8-15 minutes")
    pub estimated_delay: &'static str,
    /// Advisory message, route-aware when a start location was given
    pub recommended_action: String,
    /// When this prediction was generated (ISO 8601)
    pub timestamp: String,
    pub location: LocationEcho,
}

/// Response for POST /api/predict.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionResponse {
    pub success: bool,
    pub prediction: PredictionPayload,
}

/// Response for POST /api/predict/bulk.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkPredictionResponse {
    pub success: bool,
    /// One entry per submitted location, input order preserved
    pub predictions: Vec<BulkEntry>,
    pub timestamp: String,
}

/// Predict congestion for a single location.
///
/// Validates the request, invokes the scoring oracle exactly once and
/// classifies the result. Oracle failures surface as 500 with details;
/// nothing is cached or retried.
#[utoipa::path(
    post,
    path = "/api/predict",
    tag = "Predictions",
    request_body = PredictionBody,
    responses(
        (status = 200, description = "Classified congestion forecast", body = PredictionResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 500, description = "Oracle invocation failed", body = ErrorResponse),
    )
)]
pub async fn predict_congestion(
    State(state): State<PredictionState>,
    Json(body): Json<PredictionBody>,
) -> Result<Json<PredictionResponse>, AppError> {
    let request = PredictionRequest::from_body(&body, Utc::now().date_naive())?;
    let result = predict(state.oracle.as_ref(), &request).await?;

    Ok(Json(PredictionResponse {
        success: true,
        prediction: PredictionPayload {
            congestion_level: result.level,
            severity: result.severity,
            estimated_delay: result.estimated_delay,
            recommended_action: result.advisory,
            timestamp: Utc::now().to_rfc3339(),
            location: LocationEcho {
                area: request.area,
                road: request.road,
                weather: request.weather.as_str(),
                roadwork: request.roadwork.as_str(),
                start_location: request.start_location,
                prediction_date: request.date.map(|d| d.format("%Y-%m-%d").to_string()),
            },
        },
    }))
}

/// Predict congestion for a batch of locations.
///
/// The only request-level failure is a missing or non-array `locations`
/// field. Per-item failures are reported inline; the batch never aborts
/// part-way and output order always matches input order.
#[utoipa::path(
    post,
    path = "/api/predict/bulk",
    tag = "Predictions",
    responses(
        (status = 200, description = "One entry per location, order preserved", body = BulkPredictionResponse),
        (status = 400, description = "locations is missing or not an array", body = ErrorResponse),
    )
)]
pub async fn predict_congestion_bulk(
    State(state): State<PredictionState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<BulkPredictionResponse>, AppError> {
    // The only request-level failure: `locations` missing or not an array.
    // Malformed elements inside the array are handled per-item downstream.
    let items: Vec<serde_json::Value> = body
        .get("locations")
        .and_then(serde_json::Value::as_array)
        .cloned()
        .ok_or_else(|| {
            AppError::BadRequest("Invalid input. Expected array of locations.".to_string())
        })?;

    let predictions = predict_bulk(state.oracle.as_ref(), items, Utc::now().date_naive()).await;

    Ok(Json(BulkPredictionResponse {
        success: true,
        predictions,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::oracle::{OracleError, OracleFeatures};
    use futures::future::BoxFuture;

    struct FixedOracle(f64);

    impl ScoringOracle for FixedOracle {
        fn score<'a>(&'a self, _: &'a OracleFeatures) -> BoxFuture<'a, Result<f64, OracleError>> {
            let score = self.0;
            Box::pin(async move { Ok(score) })
        }
    }

    fn state(score: f64) -> PredictionState {
        PredictionState {
            oracle: Arc::new(FixedOracle(score)),
        }
    }

    fn valid_body() -> Json<PredictionBody> {
        Json(PredictionBody {
            area_name: Some("Koramangala".to_string()),
            road_name: Some("Silk Board".to_string()),
            weather_conditions: Some("Rainy".to_string()),
            roadwork_activity: Some("Yes".to_string()),
            start_location: None,
            prediction_date: None,
        })
    }

    #[tokio::test]
    async fn test_predict_assembles_full_response() {
        let Json(response) = predict_congestion(State(state(72.4)), valid_body())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.prediction.congestion_level, 72);
        assert_eq!(response.prediction.severity, Severity::Medium);
        assert_eq!(response.prediction.estimated_delay, "8-15 minutes");
        assert_eq!(response.prediction.location.area, "Koramangala");
        assert_eq!(response.prediction.location.weather, "Rainy");
        assert_eq!(response.prediction.location.roadwork, "Yes");
    }

    #[tokio::test]
    async fn test_predict_missing_field_is_validation_error() {
        let mut body = valid_body();
        body.0.road_name = None;
        let err = predict_congestion(State(state(50.0)), body)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingFields));
    }

    #[tokio::test]
    async fn test_predict_response_serializes_camel_case() {
        let Json(response) = predict_congestion(State(state(90.0)), valid_body())
            .await
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        let prediction = &json["prediction"];
        assert_eq!(prediction["congestionLevel"], 90);
        assert_eq!(prediction["severity"], "High");
        assert_eq!(prediction["estimatedDelay"], "15-25 minutes");
        assert!(prediction["recommendedAction"].is_string());
        assert!(prediction["location"]["startLocation"].is_null());
    }

    #[tokio::test]
    async fn test_bulk_rejects_missing_locations_field() {
        let err = predict_congestion_bulk(
            State(state(50.0)),
            Json(serde_json::json!({ "items": [] })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_bulk_rejects_non_array_locations() {
        let err = predict_congestion_bulk(
            State(state(50.0)),
            Json(serde_json::json!({ "locations": "Hebbal" })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_bulk_malformed_element_is_inline_failure() {
        let valid = serde_json::json!({
            "areaName": "Koramangala",
            "roadName": "Silk Board",
            "weatherConditions": "Clear",
            "roadworkActivity": "No"
        });
        let Json(response) = predict_congestion_bulk(
            State(state(55.0)),
            Json(serde_json::json!({ "locations": [valid, 42] })),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.predictions.len(), 2);
        assert!(matches!(response.predictions[0], BulkEntry::Success(_)));
        match &response.predictions[1] {
            BulkEntry::Failure(f) => assert_eq!(f.location, serde_json::json!(42)),
            BulkEntry::Success(_) => panic!("malformed element should fail inline"),
        }
    }

    #[tokio::test]
    async fn test_bulk_empty_array_succeeds() {
        let Json(response) = predict_congestion_bulk(
            State(state(50.0)),
            Json(serde_json::json!({ "locations": [] })),
        )
        .await
        .unwrap();
        assert!(response.success);
        assert!(response.predictions.is_empty());
        assert!(!response.timestamp.is_empty());
    }
}
