//! Prediction pipeline: request validation, single prediction, bulk fan-out.
//!
//! Validation happens before any oracle process is spawned. The bulk path
//! applies the single-item pipeline per element with per-item failure
//! isolation: one bad item never aborts or reorders the rest.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{RoadworkActivity, WeatherCondition};
use crate::errors::AppError;
use crate::services::classifier::{classify, CongestionResult, RouteContext, Severity};
use crate::services::oracle::{OracleFeatures, ScoringOracle};

/// Mandatory request fields, reported verbatim in validation errors.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "areaName",
    "roadName",
    "weatherConditions",
    "roadworkActivity",
];

/// Upper bound on simultaneously running oracle processes during a bulk
/// request. `buffered` preserves input order regardless of completion order.
const MAX_CONCURRENT_ORACLE_PROCESSES: usize = 4;

/// Prediction request as received on the wire.
///
/// All fields are optional at the serde level so that missing-field
/// validation produces the documented 400 body instead of a deserialization
/// rejection. Also echoed back verbatim inside bulk result entries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionBody {
    /// Area name (e.g. "Koramangala")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    /// Road or intersection name (e.g. "Silk Board")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road_name: Option<String>,
    /// One of Clear, Cloudy, Rainy, Foggy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_conditions: Option<String>,
    /// "Yes" or "No"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadwork_activity: Option<String>,
    /// Free-text journey start, used for route-aware advisories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
    /// Target date, ISO 8601 calendar date, today or later
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_date: Option<String>,
}

/// Validated prediction request.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub area: String,
    pub road: String,
    pub weather: WeatherCondition,
    pub roadwork: RoadworkActivity,
    pub start_location: Option<String>,
    pub date: Option<NaiveDate>,
}

impl PredictionRequest {
    /// Validate a wire body against `today`.
    ///
    /// Any missing or blank mandatory field reports the full required-field
    /// list, regardless of which subset is absent.
    pub fn from_body(body: &PredictionBody, today: NaiveDate) -> Result<Self, AppError> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let area = non_blank(&body.area_name);
        let road = non_blank(&body.road_name);
        let weather_raw = non_blank(&body.weather_conditions);
        let roadwork_raw = non_blank(&body.roadwork_activity);

        let (Some(area), Some(road), Some(weather_raw), Some(roadwork_raw)) =
            (area, road, weather_raw, roadwork_raw)
        else {
            return Err(AppError::MissingFields);
        };

        let weather = WeatherCondition::parse(&weather_raw).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid weatherConditions {:?}; expected one of Clear, Cloudy, Rainy, Foggy",
                weather_raw
            ))
        })?;

        let roadwork = RoadworkActivity::parse(&roadwork_raw).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid roadworkActivity {:?}; expected Yes or No",
                roadwork_raw
            ))
        })?;

        let date = match body.prediction_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    AppError::BadRequest(format!(
                        "Invalid predictionDate {:?}; expected YYYY-MM-DD",
                        raw
                    ))
                })?;
                if parsed < today {
                    return Err(AppError::BadRequest(
                        "predictionDate must not be in the past".to_string(),
                    ));
                }
                Some(parsed)
            }
        };

        Ok(Self {
            area,
            road,
            weather,
            roadwork,
            start_location: non_blank(&body.start_location),
            date,
        })
    }

    fn features(&self) -> OracleFeatures {
        OracleFeatures {
            area: self.area.clone(),
            road: self.road.clone(),
            weather: self.weather,
            roadwork: self.roadwork,
            date: self.date,
        }
    }

    fn route_context(&self) -> Option<RouteContext> {
        self.start_location.as_ref().map(|from| RouteContext {
            from: from.clone(),
            to: self.area.clone(),
        })
    }
}

/// Run one prediction: invoke the oracle exactly once, classify the score.
///
/// Oracle failures propagate as-is; there is no retry and no default score.
pub async fn predict(
    oracle: &dyn ScoringOracle,
    request: &PredictionRequest,
) -> Result<CongestionResult, AppError> {
    tracing::debug!(
        area = %request.area,
        road = %request.road,
        weather = request.weather.as_str(),
        roadwork = request.roadwork.as_str(),
        date = ?request.date,
        "prediction request"
    );

    let raw_score = oracle.score(&request.features()).await?;
    Ok(classify(raw_score, request.route_context().as_ref()))
}

/// One entry of a bulk result: either a classified prediction or an inline
/// error descriptor, always echoing the submitted location verbatim.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum BulkEntry {
    Success(BulkSuccess),
    Failure(BulkFailure),
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuccess {
    /// The submitted location, echoed back as received
    #[schema(value_type = Object)]
    pub location: serde_json::Value,
    /// Clamped congestion percentage
    pub congestion_level: u8,
    pub severity: Severity,
    /// Fixed delay bucket
    pub estimated_delay: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkFailure {
    /// The submitted location, echoed back as received
    #[schema(value_type = Object)]
    pub location: serde_json::Value,
    /// Always "Prediction failed"
    pub error: &'static str,
    /// What went wrong for this item
    pub message: String,
}

/// Apply the single-item pipeline over an ordered batch.
///
/// Per-item isolation: a malformed element, a validation failure or an
/// oracle failure becomes an inline `BulkFailure` while the remaining items
/// proceed — no item can abort the batch. Output order equals input order;
/// fan-out is bounded so a large batch cannot spawn unbounded oracle
/// processes.
pub async fn predict_bulk(
    oracle: &dyn ScoringOracle,
    items: Vec<serde_json::Value>,
    today: NaiveDate,
) -> Vec<BulkEntry> {
    stream::iter(items)
        .map(|raw| async move {
            match predict_one(oracle, &raw, today).await {
                Ok(result) => BulkEntry::Success(BulkSuccess {
                    location: raw,
                    congestion_level: result.level,
                    severity: result.severity,
                    estimated_delay: result.estimated_delay,
                }),
                Err(err) => BulkEntry::Failure(BulkFailure {
                    location: raw,
                    error: "Prediction failed",
                    message: err.to_string(),
                }),
            }
        })
        .buffered(MAX_CONCURRENT_ORACLE_PROCESSES)
        .collect()
        .await
}

async fn predict_one(
    oracle: &dyn ScoringOracle,
    raw: &serde_json::Value,
    today: NaiveDate,
) -> Result<CongestionResult, AppError> {
    let body: PredictionBody = serde_json::from_value(raw.clone())
        .map_err(|_| AppError::BadRequest("Location entry must be an object".to_string()))?;
    let request = PredictionRequest::from_body(&body, today)?;
    predict(oracle, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::oracle::OracleError;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Oracle stub: fixed score per call, counts invocations, fails for a
    /// designated area name.
    struct StubOracle {
        score: f64,
        fail_area: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubOracle {
        fn returning(score: f64) -> Self {
            Self {
                score,
                fail_area: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_for(score: f64, area: &'static str) -> Self {
            Self {
                score,
                fail_area: Some(area),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ScoringOracle for StubOracle {
        fn score<'a>(
            &'a self,
            features: &'a OracleFeatures,
        ) -> BoxFuture<'a, Result<f64, OracleError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fails = self.fail_area == Some(features.area.as_str());
            let score = self.score;
            Box::pin(async move {
                if fails {
                    Err(OracleError::NonZeroExit {
                        code: Some(1),
                        stderr: "model blew up".to_string(),
                    })
                } else {
                    Ok(score)
                }
            })
        }
    }

    fn body(area: &str) -> PredictionBody {
        PredictionBody {
            area_name: Some(area.to_string()),
            road_name: Some("Silk Board".to_string()),
            weather_conditions: Some("Clear".to_string()),
            roadwork_activity: Some("No".to_string()),
            start_location: None,
            prediction_date: None,
        }
    }

    fn entry(area: &str) -> serde_json::Value {
        serde_json::to_value(body(area)).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    #[test]
    fn test_validation_missing_road_lists_all_required() {
        let mut b = body("Hebbal");
        b.road_name = None;
        let err = PredictionRequest::from_body(&b, today()).unwrap_err();
        assert!(matches!(err, AppError::MissingFields));
    }

    #[test]
    fn test_validation_blank_field_counts_as_missing() {
        let mut b = body("Hebbal");
        b.area_name = Some("   ".to_string());
        let err = PredictionRequest::from_body(&b, today()).unwrap_err();
        assert!(matches!(err, AppError::MissingFields));
    }

    #[test]
    fn test_validation_rejects_unknown_weather() {
        let mut b = body("Hebbal");
        b.weather_conditions = Some("Snowy".to_string());
        let err = PredictionRequest::from_body(&b, today()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_validation_rejects_past_date() {
        let mut b = body("Hebbal");
        b.prediction_date = Some("2026-06-14".to_string());
        let err = PredictionRequest::from_body(&b, today()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_validation_accepts_today_and_future_dates() {
        let mut b = body("Hebbal");
        b.prediction_date = Some("2026-06-15".to_string());
        let req = PredictionRequest::from_body(&b, today()).unwrap();
        assert_eq!(req.date, Some(today()));

        b.prediction_date = Some("2026-07-01".to_string());
        assert!(PredictionRequest::from_body(&b, today()).is_ok());
    }

    #[test]
    fn test_validation_rejects_malformed_date() {
        let mut b = body("Hebbal");
        b.prediction_date = Some("15/06/2026".to_string());
        let err = PredictionRequest::from_body(&b, today()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_predict_invokes_oracle_once_per_call() {
        let oracle = StubOracle::returning(65.0);
        let request = PredictionRequest::from_body(&body("Hebbal"), today()).unwrap();

        let first = predict(&oracle, &request).await.unwrap();
        let second = predict(&oracle, &request).await.unwrap();

        // No caching: identical input still means two invocations.
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(first.level, 65);
        assert_eq!(second.level, 65);
    }

    #[tokio::test]
    async fn test_predict_with_start_location_phrases_route_advisory() {
        let oracle = StubOracle::returning(85.0);
        let mut b = body("Indiranagar");
        b.start_location = Some("HSR Layout".to_string());
        let request = PredictionRequest::from_body(&b, today()).unwrap();

        let result = predict(&oracle, &request).await.unwrap();
        assert!(result.advisory.contains("from HSR Layout to Indiranagar"));
    }

    #[tokio::test]
    async fn test_bulk_isolates_middle_failure_and_preserves_order() {
        let oracle = StubOracle::failing_for(70.0, "Whitefield");
        let items = vec![entry("Hebbal"), entry("Whitefield"), entry("Jayanagar")];

        let entries = predict_bulk(&oracle, items, today()).await;
        assert_eq!(entries.len(), 3);

        match &entries[0] {
            BulkEntry::Success(s) => assert_eq!(s.location["areaName"], "Hebbal"),
            BulkEntry::Failure(_) => panic!("first entry should succeed"),
        }
        match &entries[1] {
            BulkEntry::Failure(f) => {
                assert_eq!(f.location["areaName"], "Whitefield");
                assert_eq!(f.error, "Prediction failed");
                assert!(f.message.contains("model blew up"));
            }
            BulkEntry::Success(_) => panic!("second entry should fail"),
        }
        match &entries[2] {
            BulkEntry::Success(s) => assert_eq!(s.location["areaName"], "Jayanagar"),
            BulkEntry::Failure(_) => panic!("third entry should succeed"),
        }
    }

    #[tokio::test]
    async fn test_bulk_invalid_item_becomes_inline_failure() {
        let oracle = StubOracle::returning(50.0);
        let mut invalid = body("Hebbal");
        invalid.roadwork_activity = None;
        let items = vec![
            serde_json::to_value(invalid).unwrap(),
            entry("Jayanagar"),
        ];

        let entries = predict_bulk(&oracle, items, today()).await;
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], BulkEntry::Failure(_)));
        assert!(matches!(entries[1], BulkEntry::Success(_)));
        // Only the valid item reached the oracle.
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bulk_non_object_item_becomes_inline_failure() {
        let oracle = StubOracle::returning(50.0);
        let items = vec![entry("Hebbal"), serde_json::json!(42), serde_json::json!(null)];

        let entries = predict_bulk(&oracle, items, today()).await;
        assert_eq!(entries.len(), 3);

        assert!(matches!(entries[0], BulkEntry::Success(_)));
        match &entries[1] {
            BulkEntry::Failure(f) => {
                // The submitted value is echoed back untouched.
                assert_eq!(f.location, serde_json::json!(42));
                assert!(f.message.contains("must be an object"));
            }
            BulkEntry::Success(_) => panic!("second entry should fail"),
        }
        assert!(matches!(entries[2], BulkEntry::Failure(_)));
        // Only the well-formed item reached the oracle.
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bulk_empty_input_yields_empty_output() {
        let oracle = StubOracle::returning(50.0);
        let entries = predict_bulk(&oracle, Vec::new(), today()).await;
        assert!(entries.is_empty());
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_preserves_order_across_many_items() {
        let oracle = StubOracle::returning(42.0);
        let areas: Vec<String> = (0..20).map(|i| format!("Area-{i}")).collect();
        let items: Vec<serde_json::Value> = areas.iter().map(|a| entry(a)).collect();

        let entries = predict_bulk(&oracle, items, today()).await;
        let echoed: Vec<&str> = entries
            .iter()
            .map(|e| match e {
                BulkEntry::Success(s) => s.location["areaName"].as_str().unwrap(),
                BulkEntry::Failure(f) => f.location["areaName"].as_str().unwrap(),
            })
            .collect();
        assert_eq!(echoed, areas.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
