//! Congestion classification.
//!
//! Pure functions mapping a raw model score to a bounded congestion level,
//! severity tier, delay bucket and advisory string. No I/O, no clock: the
//! response timestamp is attached at the handler layer so `classify` stays
//! deterministic.
//!
//! The thresholds and wording follow the canonical table; the model's
//! revision history carried a second variant with different delay wording,
//! which is intentionally not merged in (see DESIGN.md).

use serde::Serialize;
use utoipa::ToSchema;

/// Congestion level at or above which severity is High.
const HIGH_THRESHOLD: u8 = 80;
/// Congestion level at or above which severity is Medium.
const MEDIUM_THRESHOLD: u8 = 60;
/// Congestion level at or above which severity is Moderate.
const MODERATE_THRESHOLD: u8 = 40;

/// Severity tier, a pure function of congestion level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub enum Severity {
    Low,
    Moderate,
    Medium,
    High,
}

/// Start/destination pair used to phrase a location-aware advisory.
#[derive(Debug, Clone)]
pub struct RouteContext {
    pub from: String,
    pub to: String,
}

/// Classified congestion forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongestionResult {
    /// Clamped congestion percentage, always within [0, 100].
    pub level: u8,
    pub severity: Severity,
    /// Fixed delay bucket (e.g. "8-15 minutes").
    pub estimated_delay: &'static str,
    /// Human-readable recommendation, optionally route-aware.
    pub advisory: String,
}

/// Classify a raw oracle score.
///
/// The oracle is not trusted to respect bounds: the score is clamped into
/// [0, 100] before rounding, so negative and oversized scores map to the
/// nearest valid level. Deterministic and side-effect-free.
pub fn classify(raw_score: f64, route: Option<&RouteContext>) -> CongestionResult {
    let level = raw_score.clamp(0.0, 100.0).round() as u8;
    let severity = severity_for(level);

    CongestionResult {
        level,
        severity,
        estimated_delay: delay_bucket(level),
        advisory: advisory(severity, route),
    }
}

/// Severity tie-break table, evaluated high-to-low, first match wins.
fn severity_for(level: u8) -> Severity {
    if level >= HIGH_THRESHOLD {
        Severity::High
    } else if level >= MEDIUM_THRESHOLD {
        Severity::Medium
    } else if level >= MODERATE_THRESHOLD {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

/// Estimated delay bucket, same thresholds as severity.
fn delay_bucket(level: u8) -> &'static str {
    if level >= HIGH_THRESHOLD {
        "15-25 minutes"
    } else if level >= MEDIUM_THRESHOLD {
        "8-15 minutes"
    } else if level >= MODERATE_THRESHOLD {
        "3-8 minutes"
    } else {
        "0-3 minutes"
    }
}

/// Advisory template per severity tier.
///
/// When a route context is available the "from X to Y" clause is
/// interpolated; otherwise the clause is omitted, never left as a
/// placeholder.
fn advisory(severity: Severity, route: Option<&RouteContext>) -> String {
    match route {
        Some(ctx) => match severity {
            Severity::High => format!(
                "Avoid the route from {} to {}. Consider alternative paths.",
                ctx.from, ctx.to
            ),
            Severity::Medium => format!(
                "Heavy traffic expected from {} to {}. Allow extra time.",
                ctx.from, ctx.to
            ),
            Severity::Moderate => format!(
                "Moderate traffic from {} to {}. Plan accordingly.",
                ctx.from, ctx.to
            ),
            Severity::Low => format!(
                "Light traffic from {} to {}. Good time to travel.",
                ctx.from, ctx.to
            ),
        },
        None => match severity {
            Severity::High => "Avoid this route. Consider alternative paths.".to_string(),
            Severity::Medium => "Heavy traffic expected. Allow extra time.".to_string(),
            Severity::Moderate => "Moderate traffic. Plan accordingly.".to_string(),
            Severity::Low => "Light traffic. Good time to travel.".to_string(),
        },
    }
}
