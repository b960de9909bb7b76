//! Scoring oracle abstraction and the out-of-process implementation.
//!
//! The congestion model lives in an external script that takes categorical
//! features as argv and prints a single floating-point score on stdout.
//! Everything downstream (classifier, handlers) depends only on the
//! `ScoringOracle` trait, so the process-spawning implementation can be
//! swapped for an in-process model or a test stub.

use futures::future::BoxFuture;
use tokio::process::Command;

use crate::catalog::{RoadworkActivity, WeatherCondition};

/// Feature tuple passed to the scoring model.
#[derive(Debug, Clone)]
pub struct OracleFeatures {
    pub area: String,
    pub road: String,
    pub weather: WeatherCondition,
    pub roadwork: RoadworkActivity,
    /// Optional target date (ISO 8601 calendar date). When absent the model
    /// predicts for "now".
    pub date: Option<chrono::NaiveDate>,
}

/// Failure modes of a single oracle invocation.
///
/// No retry happens anywhere: a failed invocation surfaces directly as an
/// error, never a defaulted score.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("failed to spawn prediction process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("prediction process exited with {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("prediction output is not a number: {raw:?}")]
    Unparsable { raw: String },

    #[error("prediction output is not finite: {0}")]
    NonFinite(f64),
}

impl OracleError {
    /// Exit code of the underlying process, when it got far enough to have one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            OracleError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

/// An opaque source of raw congestion scores.
///
/// `BoxFuture` keeps the trait object-safe so handlers can hold an
/// `Arc<dyn ScoringOracle>` regardless of the implementation.
pub trait ScoringOracle: Send + Sync {
    fn score<'a>(&'a self, features: &'a OracleFeatures) -> BoxFuture<'a, Result<f64, OracleError>>;
}

/// Oracle that shells out to the prediction script.
///
/// Spawns `<command> <script> <area> <road> <weather> <roadwork> [date]`
/// per invocation and parses trimmed stdout as a finite f64. One process
/// per prediction; no pooling, no caching.
#[derive(Debug, Clone)]
pub struct ProcessOracle {
    command: String,
    script: String,
}

impl ProcessOracle {
    pub fn new(command: &str, script: &str) -> Self {
        Self {
            command: command.to_string(),
            script: script.to_string(),
        }
    }

    async fn run(&self, features: &OracleFeatures) -> Result<f64, OracleError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(&self.script)
            .arg(&features.area)
            .arg(&features.road)
            .arg(features.weather.as_str())
            .arg(features.roadwork.as_str());
        if let Some(date) = features.date {
            cmd.arg(date.format("%Y-%m-%d").to_string());
        }

        let output = cmd.output().await?;

        if !output.status.success() {
            return Err(OracleError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_score(&String::from_utf8_lossy(&output.stdout))
    }
}

impl ScoringOracle for ProcessOracle {
    fn score<'a>(&'a self, features: &'a OracleFeatures) -> BoxFuture<'a, Result<f64, OracleError>> {
        Box::pin(self.run(features))
    }
}

/// Parse the script's stdout into a finite score.
///
/// The script prints one number followed by a newline; anything else
/// (empty output, tracebacks leaking to stdout, NaN/inf) is an error.
fn parse_score(stdout: &str) -> Result<f64, OracleError> {
    let trimmed = stdout.trim();
    let score: f64 = trimmed.parse().map_err(|_| OracleError::Unparsable {
        raw: trimmed.to_string(),
    })?;
    if !score.is_finite() {
        return Err(OracleError::NonFinite(score));
    }
    Ok(score)
}
