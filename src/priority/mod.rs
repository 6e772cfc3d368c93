//! Remediation ordering: rank failing controls by urgency and pull out
//! the quick wins.
//!
//! Priority is risk divided by cost, weighted by business impact:
//!
//! ```text
//! priority = risk_score x (1 / cost_factor[remediation_cost])
//!          x impact_weight[business_impact]
//! ```
//!
//! A quick win is a failing control that is high risk, cheap to fix, and
//! critical or high impact.

use crate::config::{FinancialParameters, ScoringConfig};
use crate::core::{BusinessImpact, Control, PriorityResult, RemediationCost};
use crate::errors::EngineError;
use crate::risk;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Priority score for one control given its already-computed risk score.
pub fn priority_score(
    risk_score: f64,
    control: &Control,
    scoring: &ScoringConfig,
    params: &FinancialParameters,
) -> f64 {
    let cost_factor = params.remediation_cost_factors.for_cost(control.remediation_cost);
    let impact_weight = scoring.impact_weights.for_impact(control.business_impact);
    risk_score * (1.0 / cost_factor) * impact_weight
}

fn is_quick_win(control: &Control, risk_score: f64, params: &FinancialParameters) -> bool {
    risk_score > params.quick_win_risk_threshold
        && control.remediation_cost == RemediationCost::Low
        && matches!(
            control.business_impact,
            BusinessImpact::Critical | BusinessImpact::High
        )
}

/// Rank failing controls in descending remediation priority.
///
/// Non-failing members of the input are ignored. Ties break by descending
/// risk score, then ascending control id, so the order is deterministic.
/// Configs are validated eagerly.
pub fn rank(
    controls: &[Control],
    as_of: NaiveDate,
    scoring: &ScoringConfig,
    params: &FinancialParameters,
) -> Result<Vec<PriorityResult>, EngineError> {
    scoring.validate()?;
    params.validate()?;

    let mut entries: Vec<(PriorityResult, &Control)> = controls
        .iter()
        .filter(|c| c.status.is_failing())
        .map(|control| {
            let risk_score = risk::score(control, as_of, scoring).risk_score;
            let result = PriorityResult {
                control_id: control.id.clone(),
                priority_score: priority_score(risk_score, control, scoring, params),
                risk_score,
                rank: 0, // assigned after sorting
                quick_win: is_quick_win(control, risk_score, params),
            };
            (result, control)
        })
        .collect();

    entries.sort_by(|(a, a_control), (b, b_control)| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
            .then(
                b.risk_score
                    .partial_cmp(&a.risk_score)
                    .unwrap_or(Ordering::Equal),
            )
            .then_with(|| a_control.id.cmp(&b_control.id))
    });

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(i, (mut result, _))| {
            result.rank = i + 1;
            result
        })
        .collect())
}

/// The quick-win subset of a ranking, in ranked order.
pub fn quick_wins(ranked: &[PriorityResult]) -> Vec<&PriorityResult> {
    ranked.iter().filter(|r| r.quick_win).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ControlStatus, ControlType};
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn failing_control(
        id: &str,
        impact: BusinessImpact,
        cost: RemediationCost,
        weight: f64,
    ) -> Control {
        Control {
            id: id.into(),
            status: ControlStatus::Fail,
            weight,
            business_impact: impact,
            control_type: ControlType::Detective,
            automated: false,
            remediation_cost: cost,
            last_test_date: date(2026, 1, 1),
            next_test_due: date(2026, 7, 1),
            family_code: "AC".into(),
        }
    }

    #[test]
    fn priority_follows_risk_over_cost_times_impact() {
        let scoring = ScoringConfig::default();
        let params = FinancialParameters::default();
        let control = failing_control("AC-1", BusinessImpact::Critical, RemediationCost::High, 8.0);

        let score = priority_score(50.0, &control, &scoring, &params);
        // 50 x (1/5.0) x 2.0
        assert!((score - 20.0).abs() < EPS);
    }

    #[test]
    fn cheap_high_impact_fixes_outrank_expensive_ones() {
        let as_of = date(2026, 6, 1);
        let scoring = ScoringConfig::default();
        let params = FinancialParameters::default();

        // Same risk profile, different remediation cost bands.
        let cheap = failing_control("AC-cheap", BusinessImpact::High, RemediationCost::Low, 6.0);
        let pricey = failing_control("AC-pricey", BusinessImpact::High, RemediationCost::High, 6.0);

        let ranked = rank(&[pricey, cheap], as_of, &scoring, &params).unwrap();
        assert_eq!(ranked[0].control_id, "AC-cheap");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[0].priority_score > ranked[1].priority_score);
        // Identical risk underneath.
        assert!((ranked[0].risk_score - ranked[1].risk_score).abs() < EPS);
    }

    #[test]
    fn ties_break_by_risk_then_id() {
        let as_of = date(2026, 6, 1);
        let scoring = ScoringConfig::default();
        let params = FinancialParameters::default();

        let b = failing_control("B-ctl", BusinessImpact::Medium, RemediationCost::Medium, 5.0);
        let a = failing_control("A-ctl", BusinessImpact::Medium, RemediationCost::Medium, 5.0);

        let ranked = rank(&[b, a], as_of, &scoring, &params).unwrap();
        assert_eq!(ranked[0].control_id, "A-ctl");
        assert_eq!(ranked[1].control_id, "B-ctl");
    }

    #[test]
    fn non_failing_controls_are_ignored() {
        let as_of = date(2026, 6, 1);
        let mut passing = failing_control("AC-ok", BusinessImpact::High, RemediationCost::Low, 9.0);
        passing.status = ControlStatus::Pass;
        let mut na = failing_control("AC-na", BusinessImpact::High, RemediationCost::Low, 9.0);
        na.status = ControlStatus::NotApplicable;
        let failing = failing_control("AC-bad", BusinessImpact::High, RemediationCost::Low, 9.0);

        let ranked = rank(
            &[passing, na, failing],
            as_of,
            &ScoringConfig::default(),
            &FinancialParameters::default(),
        )
        .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].control_id, "AC-bad");
    }

    #[test]
    fn quick_wins_require_risk_cost_and_impact() {
        let as_of = date(2026, 6, 1);
        let scoring = ScoringConfig::default();
        let params = FinancialParameters::default();

        // weight 9, fail, critical: risk 9 x 3 x 1 x 2 x 1 = 54 > threshold.
        let win = failing_control("AC-win", BusinessImpact::Critical, RemediationCost::Low, 9.0);
        // Cheap and risky but only medium impact.
        let med_impact =
            failing_control("AC-med", BusinessImpact::Medium, RemediationCost::Low, 9.0);
        // Critical and risky but expensive.
        let pricey =
            failing_control("AC-exp", BusinessImpact::Critical, RemediationCost::High, 9.0);
        // Cheap, critical, but barely any risk.
        let mut tiny = failing_control("AC-tiny", BusinessImpact::Critical, RemediationCost::Low, 1.0);
        tiny.status = ControlStatus::Warn;

        let ranked = rank(&[win, med_impact, pricey, tiny], as_of, &scoring, &params).unwrap();
        let wins = quick_wins(&ranked);
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].control_id, "AC-win");
        assert!(wins[0].quick_win);
    }

    #[test]
    fn rank_validates_configs_eagerly() {
        let params = FinancialParameters {
            residual_risk_factor: 2.0,
            ..FinancialParameters::default()
        };
        let err = rank(&[], date(2026, 6, 1), &ScoringConfig::default(), &params).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }
}
