//! Multi-factor control risk scoring and compliance aggregation.
//!
//! A control's risk is the product of six named factors:
//!
//! ```text
//! risk = weight
//!      x status_multiplier[status]
//!      x staleness_factor(days_overdue)
//!      x impact_weight[business_impact]
//!      x type_factor[control_type]
//!      x automation_factor[automated]
//! ```
//!
//! Each factor is recorded in the result so a reported score can be
//! audited factor-by-factor. All functions here are pure: same control,
//! same `as_of` date, same config, bit-identical result.

use crate::config::{ComplianceMode, ScoringConfig};
use crate::core::{
    ComplianceSummary, Control, ControlStatus, RiskFactors, RiskScoreResult, StatusCounts,
};
use crate::errors::EngineError;
use chrono::NaiveDate;
use im::{HashMap, Vector};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Staleness grows linearly with days overdue and saturates at the
/// configured cap, so a control years past due does not dominate the
/// portfolio on staleness alone.
pub fn staleness_factor(days_overdue: i64, config: &ScoringConfig) -> f64 {
    (1.0 + days_overdue as f64 * config.daily_staleness_penalty).min(config.max_staleness_factor)
}

/// Score one control as of a given date.
///
/// Total for any well-formed `Control`: never fails, never returns NaN
/// for finite inputs. A `not_applicable` status zeroes the score through
/// its multiplier; the remaining factors are still reported.
pub fn score(control: &Control, as_of: NaiveDate, config: &ScoringConfig) -> RiskScoreResult {
    let days_overdue = control.days_overdue(as_of);
    let factors = RiskFactors {
        status_multiplier: config.status_multipliers.for_status(control.status),
        staleness_factor: staleness_factor(days_overdue, config),
        impact_weight: config.impact_weights.for_impact(control.business_impact),
        type_factor: config.type_factors.for_type(control.control_type),
        automation_factor: if control.automated {
            config.automation_factor
        } else {
            1.0
        },
        days_overdue,
    };
    let risk_score = control.weight
        * factors.status_multiplier
        * factors.staleness_factor
        * factors.impact_weight
        * factors.type_factor
        * factors.automation_factor;
    RiskScoreResult {
        control_id: control.id.clone(),
        risk_score,
        factors,
        scored_at: as_of,
    }
}

/// Check the control-record fields the engine has documented domains for.
pub fn validate_control(control: &Control) -> Result<(), EngineError> {
    if control.weight.is_finite() && (1.0..=10.0).contains(&control.weight) {
        Ok(())
    } else {
        Err(EngineError::out_of_domain(
            format!("control {} weight", control.id),
            control.weight,
            "a weight in [1.0, 10.0]",
        ))
    }
}

/// Score a batch of controls in parallel, reporting per-item outcomes.
///
/// A malformed control yields an `Err` in its slot and never aborts the
/// rest of the batch. Output order matches input order.
pub fn score_batch(
    controls: &[Control],
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> Vec<Result<RiskScoreResult, EngineError>> {
    log::debug!("scoring batch of {} controls as of {}", controls.len(), as_of);
    controls
        .par_iter()
        .map(|control| {
            validate_control(control)
                .map(|()| score(control, as_of, config))
                .inspect_err(|err| log::warn!("skipping control {}: {}", control.id, err))
        })
        .collect()
}

/// Sum of member risk scores per family. Not-applicable members contribute
/// their (zero) score, so every family present in the input appears in the
/// output.
pub fn aggregate_family(
    controls: &[Control],
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for control in controls {
        let risk = score(control, as_of, config).risk_score;
        let current = totals.get(&control.family_code).copied().unwrap_or(0.0);
        totals.insert(control.family_code.clone(), current + risk);
    }
    totals
}

/// Organization compliance score in [0, 100], in the configured mode.
pub fn compliance_score(controls: &[Control], as_of: NaiveDate, config: &ScoringConfig) -> f64 {
    match config.compliance_mode {
        ComplianceMode::PassRate => pass_rate_score(controls),
        ComplianceMode::RiskNormalized => risk_normalized_score(controls, as_of, config),
    }
}

/// Passing over active. An empty active population is vacuously compliant.
fn pass_rate_score(controls: &[Control]) -> f64 {
    let active = controls.iter().filter(|c| c.status.is_active()).count();
    if active == 0 {
        return 100.0;
    }
    let passing = controls
        .iter()
        .filter(|c| c.status == ControlStatus::Pass)
        .count();
    100.0 * passing as f64 / active as f64
}

/// 100 x (1 - actual risk / worst-case risk) over active controls.
/// Guarded to 100 when the worst case is itself zero.
fn risk_normalized_score(controls: &[Control], as_of: NaiveDate, config: &ScoringConfig) -> f64 {
    let mut actual = 0.0;
    let mut max_possible = 0.0;
    for control in controls.iter().filter(|c| c.status.is_active()) {
        actual += score(control, as_of, config).risk_score;
        max_possible += worst_case_score(control, config);
    }
    if max_possible == 0.0 {
        return 100.0;
    }
    (100.0 * (1.0 - actual / max_possible)).clamp(0.0, 100.0)
}

/// The score a control would carry at its worst status, fully stale, with
/// the heaviest impact weight. Type and automation stay the control's own:
/// they describe what the control *is*, not a state it can degrade into.
fn worst_case_score(control: &Control, config: &ScoringConfig) -> f64 {
    let automation = if control.automated {
        config.automation_factor
    } else {
        1.0
    };
    control.weight
        * config.status_multipliers.worst_active()
        * config.max_staleness_factor
        * config.impact_weights.worst()
        * config.type_factors.for_type(control.control_type)
        * automation
}

/// Up to `n` highest-risk controls, descending. Ties break by descending
/// weight, then ascending control id, so output order is deterministic.
pub fn top_risks(
    controls: &[Control],
    n: usize,
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> Vector<RiskScoreResult> {
    let mut scored: Vec<(&Control, RiskScoreResult)> = controls
        .iter()
        .map(|control| (control, score(control, as_of, config)))
        .collect();
    scored.sort_by(|(a_control, a), (b_control, b)| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(Ordering::Equal)
            .then(
                b_control
                    .weight
                    .partial_cmp(&a_control.weight)
                    .unwrap_or(Ordering::Equal),
            )
            .then_with(|| a_control.id.cmp(&b_control.id))
    });
    scored
        .into_iter()
        .take(n)
        .map(|(_, result)| result)
        .collect()
}

/// One-call aggregate for reporting collaborators: status counts, the
/// overall and per-family compliance scores, and the top-N risk ranking.
pub fn summarize(
    controls: &[Control],
    top_n: usize,
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> ComplianceSummary {
    log::debug!("summarizing {} controls as of {}", controls.len(), as_of);
    let mut status_counts = StatusCounts::default();
    for control in controls {
        status_counts.record(control.status);
    }
    let total_active = controls.iter().filter(|c| c.status.is_active()).count();

    let mut by_family: HashMap<String, Vec<Control>> = HashMap::new();
    for control in controls {
        match by_family.get_mut(&control.family_code) {
            Some(members) => members.push(control.clone()),
            None => {
                by_family.insert(control.family_code.clone(), vec![control.clone()]);
            }
        }
    }
    let family_compliance: HashMap<String, f64> = by_family
        .iter()
        .map(|(family, members)| (family.clone(), compliance_score(members, as_of, config)))
        .collect();

    ComplianceSummary {
        total_active,
        status_counts,
        overall_compliance_score: compliance_score(controls, as_of, config),
        family_compliance,
        top_risks: top_risks(controls, top_n, as_of, config),
    }
}
