//! Compliance trend analysis over historical snapshot series.
//!
//! Velocity is the ordinary least-squares slope of score against elapsed
//! months since the first snapshot; everything else (projection, time to
//! target, direction classification, remediation velocity) derives from
//! it. Series are chronologically ordered, append-only input from the
//! storage collaborator; the engine never reorders them.

use crate::config::TrendConfig;
use crate::core::{
    ControlStatus, HistoricalSnapshot, TargetProjection, TrendDirection, TrendResult,
};
use crate::errors::EngineError;
use chrono::{Duration, NaiveDate};

/// Average Gregorian month, used to convert day spans to months.
const DAYS_PER_MONTH: f64 = 30.44;

fn months_since(start: NaiveDate, date: NaiveDate) -> f64 {
    date.signed_duration_since(start).num_days() as f64 / DAYS_PER_MONTH
}

/// Least-squares slope of score vs. elapsed months, in points per month.
///
/// A single snapshot has no slope and is defined as 0. An empty series is
/// `InsufficientData`. A multi-point series whose snapshots all share one
/// timestamp has no defined slope and no documented sentinel, so it
/// surfaces as `DegenerateDivision` (the caller violated the
/// unique-timestamp invariant).
pub fn velocity(series: &[HistoricalSnapshot]) -> Result<f64, EngineError> {
    match series {
        [] => Err(EngineError::InsufficientData {
            subject: "historical series".into(),
            required: 1,
            actual: 0,
        }),
        [_] => Ok(0.0),
        _ => {
            let start = series[0].recorded_at;
            let n = series.len() as f64;
            let xs: Vec<f64> = series
                .iter()
                .map(|s| months_since(start, s.recorded_at))
                .collect();
            let x_mean = xs.iter().sum::<f64>() / n;
            let y_mean = series.iter().map(|s| s.score).sum::<f64>() / n;

            let mut covariance = 0.0;
            let mut variance = 0.0;
            for (x, snapshot) in xs.iter().zip(series) {
                covariance += (x - x_mean) * (snapshot.score - y_mean);
                variance += (x - x_mean) * (x - x_mean);
            }
            if variance == 0.0 {
                return Err(EngineError::DegenerateDivision {
                    operation: "velocity",
                    detail: format!(
                        "{} snapshots for {} share a single timestamp",
                        series.len(),
                        series[0].control_id
                    ),
                });
            }
            Ok(covariance / variance)
        }
    }
}

/// Linear projection `current + velocity x months`, clamped to [0, 100].
pub fn projected_score(current_score: f64, velocity: f64, months_ahead: f64) -> f64 {
    (current_score + velocity * months_ahead).clamp(0.0, 100.0)
}

/// Months until the score reaches `target_score` at the current velocity.
pub fn months_to_target(
    current_score: f64,
    velocity: f64,
    target_score: f64,
) -> TargetProjection {
    if target_score <= current_score {
        TargetProjection::AlreadyMet
    } else if velocity > 0.0 {
        TargetProjection::Months((target_score - current_score) / velocity)
    } else {
        TargetProjection::Unreachable
    }
}

/// Severity sequence of the active snapshots, oldest first.
fn severity_path(series: &[HistoricalSnapshot]) -> Vec<i16> {
    series
        .iter()
        .filter(|s| s.status.is_active())
        .map(|s| i16::from(s.status.severity_rank()))
        .collect()
}

/// Number of times the status trajectory changes direction, e.g.
/// pass -> fail -> pass is one reversal. Flat stretches do not reset the
/// running direction.
fn direction_reversals(series: &[HistoricalSnapshot]) -> usize {
    let path = severity_path(series);
    let mut reversals = 0;
    let mut last_direction = 0i16;
    for window in path.windows(2) {
        let direction = (window[1] - window[0]).signum();
        if direction != 0 {
            if last_direction != 0 && direction != last_direction {
                reversals += 1;
            }
            last_direction = direction;
        }
    }
    reversals
}

/// True when no consecutive pair of active statuses gets worse.
fn statuses_non_worsening(series: &[HistoricalSnapshot]) -> bool {
    severity_path(series).windows(2).all(|w| w[1] <= w[0])
}

/// Classify a series given its velocity.
///
/// Improving demands both a positive slope and statuses that never back-
/// slide; a rising score with status churn underneath is not "improving".
pub fn classify(
    series: &[HistoricalSnapshot],
    velocity: f64,
    config: &TrendConfig,
) -> TrendDirection {
    if velocity > config.velocity_epsilon && statuses_non_worsening(series) {
        TrendDirection::Improving
    } else if velocity < -config.velocity_epsilon {
        TrendDirection::Degrading
    } else if direction_reversals(series) >= config.reversal_threshold {
        TrendDirection::Oscillating
    } else {
        TrendDirection::Stable
    }
}

/// Controls remediated per month: how many series crossed from a failing
/// status (fail or warn) to pass inside the window ending at `window_end`.
/// Each control counts at most once.
pub fn remediation_velocity(
    all_series: &[Vec<HistoricalSnapshot>],
    window_months: f64,
    window_end: NaiveDate,
) -> Result<f64, EngineError> {
    if !(window_months.is_finite() && window_months > 0.0) {
        return Err(EngineError::out_of_domain(
            "window_months",
            window_months,
            "a finite window > 0",
        ));
    }
    let window_days = (window_months * DAYS_PER_MONTH).ceil() as i64;
    let window_start = window_end - Duration::days(window_days);

    let remediated = all_series
        .iter()
        .filter(|series| {
            series.windows(2).any(|pair| {
                pair[0].status.is_failing()
                    && pair[1].status == ControlStatus::Pass
                    && pair[1].recorded_at > window_start
                    && pair[1].recorded_at <= window_end
            })
        })
        .count();
    Ok(remediated as f64 / window_months)
}

/// Full trend report for one series: velocity, projection at the requested
/// horizon, direction, and time to the target score.
pub fn analyze(
    series: &[HistoricalSnapshot],
    target_score: f64,
    months_ahead: f64,
    config: &TrendConfig,
) -> Result<TrendResult, EngineError> {
    config.validate()?;
    if series.len() < config.min_snapshots {
        let subject = series
            .first()
            .map(|s| format!("series for {}", s.control_id))
            .unwrap_or_else(|| "historical series".into());
        return Err(EngineError::InsufficientData {
            subject,
            required: config.min_snapshots,
            actual: series.len(),
        });
    }
    let velocity = velocity(series)?;
    let current_score = series[series.len() - 1].score;
    Ok(TrendResult {
        velocity,
        current_score,
        projected_score: projected_score(current_score, velocity, months_ahead),
        direction: classify(series, velocity, config),
        months_to_target: months_to_target(current_score, velocity, target_score),
    })
}
