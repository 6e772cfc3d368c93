//! Financial justification for remediation: risk exposure, ROI, NPV, and
//! payback math over a set of failing controls.
//!
//! Breach probability compounds per distinct control family present among
//! the failures, and is capped at 1.0 *before* it multiplies any cost:
//! compounded family multipliers routinely push the raw product above 1.0,
//! and an uncapped product double-counts exposure.

use crate::config::FinancialParameters;
use crate::core::{Control, PaybackPeriod, RoiPercentage, RoiResult};
use crate::errors::EngineError;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Compounded annual breach probability for the given failures, in [0, 1].
///
/// Each distinct family among the failing controls applies its configured
/// multiplier once, however many of its controls are failing.
pub fn breach_probability(failing: &[Control], params: &FinancialParameters) -> f64 {
    // BTreeSet for a deterministic multiplication order.
    let families: BTreeSet<&str> = failing.iter().map(|c| c.family_code.as_str()).collect();
    let mut probability = params.base_breach_probability;
    for family in families {
        if let Some(multiplier) = params.family_probability_multipliers.get(family) {
            probability *= multiplier;
        }
    }
    probability.min(1.0)
}

/// Expected annual loss with the failures unremediated.
pub fn risk_exposure(failing: &[Control], params: &FinancialParameters) -> f64 {
    breach_probability(failing, params) * params.expected_breach_cost
}

/// Total cost to fix: per-control hours at the configured hourly rate.
pub fn remediation_cost(failing: &[Control], params: &FinancialParameters) -> f64 {
    failing
        .iter()
        .map(|c| params.remediation_hours.for_cost(c.remediation_cost) * params.hourly_rate)
        .sum()
}

/// Exposure removed by remediating, given the fraction of breach
/// probability that remains afterwards.
pub fn risk_reduction_value(
    failing: &[Control],
    params: &FinancialParameters,
    post_remediation_factor: f64,
) -> f64 {
    let probability = breach_probability(failing, params);
    let before = probability * params.expected_breach_cost;
    let after = probability * post_remediation_factor * params.expected_breach_cost;
    before - after
}

/// Discounted value of the risk reduction spread evenly over the horizon,
/// less the upfront remediation cost.
fn net_present_value(risk_reduction: f64, cost: f64, params: &FinancialParameters) -> f64 {
    let annual_benefit = risk_reduction / f64::from(params.horizon_years);
    let discounted: f64 = (1..=params.horizon_years)
        .map(|year| annual_benefit / (1.0 + params.discount_rate).powi(year as i32))
        .sum();
    discounted - cost
}

fn compute(failing: &[Control], params: &FinancialParameters) -> RoiResult {
    let probability = breach_probability(failing, params);
    let risk_exposure_before = probability * params.expected_breach_cost;
    let risk_exposure_after =
        probability * params.residual_risk_factor * params.expected_breach_cost;
    let risk_reduction = risk_exposure_before - risk_exposure_after;
    let cost = remediation_cost(failing, params);

    let roi_percentage = if cost == 0.0 {
        // Defined sentinel: benefit with nothing to spend.
        RoiPercentage::Unbounded
    } else {
        RoiPercentage::Finite(100.0 * (risk_reduction - cost) / cost)
    };

    let payback_period_months = if risk_reduction <= 0.0 {
        PaybackPeriod::Never
    } else {
        PaybackPeriod::Months(cost / (risk_reduction / 12.0))
    };

    RoiResult {
        risk_exposure_before,
        risk_exposure_after,
        remediation_cost: cost,
        risk_reduction_value: risk_reduction,
        roi_percentage,
        npv: net_present_value(risk_reduction, cost, params),
        payback_period_months,
    }
}

/// Full ROI analysis for one remediation scenario. Parameters are
/// validated eagerly; the computation itself cannot fail.
pub fn calculate(failing: &[Control], params: &FinancialParameters) -> Result<RoiResult, EngineError> {
    params.validate()?;
    log::debug!("computing ROI over {} failing controls", failing.len());
    Ok(compute(failing, params))
}

/// Descending comparison by ROI percentage; `Unbounded` sorts above any
/// finite percentage.
fn roi_descending(a: &RoiResult, b: &RoiResult) -> Ordering {
    match (a.roi_percentage, b.roi_percentage) {
        (RoiPercentage::Unbounded, RoiPercentage::Unbounded) => Ordering::Equal,
        (RoiPercentage::Unbounded, RoiPercentage::Finite(_)) => Ordering::Less,
        (RoiPercentage::Finite(_), RoiPercentage::Unbounded) => Ordering::Greater,
        (RoiPercentage::Finite(x), RoiPercentage::Finite(y)) => {
            y.partial_cmp(&x).unwrap_or(Ordering::Equal)
        }
    }
}

/// What-if comparison: one ROI result per candidate control subset, best
/// ROI percentage first.
pub fn scenario_compare(
    scenarios: &[Vec<Control>],
    params: &FinancialParameters,
) -> Result<Vec<RoiResult>, EngineError> {
    params.validate()?;
    let mut results: Vec<RoiResult> = scenarios
        .iter()
        .map(|scenario| compute(scenario, params))
        .collect();
    results.sort_by(roi_descending);
    Ok(results)
}
