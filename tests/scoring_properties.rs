//! Property-based tests for the engine's universal invariants:
//! - not-applicable controls always score zero
//! - staleness is monotone in days overdue and never exceeds its cap
//! - compliance scores stay within [0, 100] in both modes
//! - projections stay within [0, 100] for any velocity and horizon
//! - breach probability never exceeds 1.0 however multipliers compound
//! - scoring is deterministic

use chrono::NaiveDate;
use controlmap::{
    risk, roi, trend, BusinessImpact, ComplianceMode, Control, ControlStatus, ControlType,
    FinancialParameters, RemediationCost, ScoringConfig,
};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = ControlStatus> {
    prop_oneof![
        Just(ControlStatus::Pass),
        Just(ControlStatus::Warn),
        Just(ControlStatus::Fail),
        Just(ControlStatus::NotTested),
        Just(ControlStatus::NotApplicable),
    ]
}

fn impact_strategy() -> impl Strategy<Value = BusinessImpact> {
    prop_oneof![
        Just(BusinessImpact::Critical),
        Just(BusinessImpact::High),
        Just(BusinessImpact::Medium),
        Just(BusinessImpact::Low),
    ]
}

fn type_strategy() -> impl Strategy<Value = ControlType> {
    prop_oneof![
        Just(ControlType::Preventive),
        Just(ControlType::Detective),
        Just(ControlType::Corrective),
    ]
}

fn cost_strategy() -> impl Strategy<Value = RemediationCost> {
    prop_oneof![
        Just(RemediationCost::Low),
        Just(RemediationCost::Medium),
        Just(RemediationCost::High),
    ]
}

prop_compose! {
    fn control_strategy()(
        id in "[A-Z]{2}-[0-9]{1,2}",
        status in status_strategy(),
        weight in 1.0f64..=10.0,
        impact in impact_strategy(),
        control_type in type_strategy(),
        automated in any::<bool>(),
        cost in cost_strategy(),
        due_offset in -400i64..400,
        family in "[A-Z]{2}",
    ) -> Control {
        let base = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let next_test_due = base + chrono::Duration::days(due_offset);
        Control {
            id,
            status,
            weight,
            business_impact: impact,
            control_type,
            automated,
            remediation_cost: cost,
            last_test_date: next_test_due - chrono::Duration::days(180),
            next_test_due,
            family_code: family,
        }
    }
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
}

proptest! {
    #[test]
    fn not_applicable_always_scores_zero(mut control in control_strategy()) {
        control.status = ControlStatus::NotApplicable;
        let result = risk::score(&control, as_of(), &ScoringConfig::default());
        prop_assert_eq!(result.risk_score, 0.0);
    }

    #[test]
    fn risk_score_is_never_negative(control in control_strategy()) {
        let result = risk::score(&control, as_of(), &ScoringConfig::default());
        prop_assert!(result.risk_score >= 0.0);
        prop_assert!(result.risk_score.is_finite());
    }

    #[test]
    fn staleness_is_monotone_and_capped(days_a in 0i64..20_000, days_b in 0i64..20_000) {
        let config = ScoringConfig::default();
        let (lo, hi) = if days_a <= days_b { (days_a, days_b) } else { (days_b, days_a) };
        let f_lo = risk::staleness_factor(lo, &config);
        let f_hi = risk::staleness_factor(hi, &config);
        prop_assert!(f_lo <= f_hi);
        prop_assert!(f_hi <= config.max_staleness_factor);
        prop_assert!(f_lo >= 1.0);
    }

    #[test]
    fn compliance_stays_in_bounds_in_both_modes(
        controls in prop::collection::vec(control_strategy(), 0..40)
    ) {
        for mode in [ComplianceMode::PassRate, ComplianceMode::RiskNormalized] {
            let config = ScoringConfig { compliance_mode: mode, ..ScoringConfig::default() };
            let score = risk::compliance_score(&controls, as_of(), &config);
            prop_assert!((0.0..=100.0).contains(&score), "{mode:?} produced {score}");
        }
    }

    #[test]
    fn projection_is_always_clamped(
        current in 0.0f64..=100.0,
        velocity in -1_000.0f64..=1_000.0,
        months in 0.0f64..=600.0,
    ) {
        let projected = trend::projected_score(current, velocity, months);
        prop_assert!((0.0..=100.0).contains(&projected));
    }

    #[test]
    fn breach_probability_is_capped_for_any_multipliers(
        controls in prop::collection::vec(control_strategy(), 1..20),
        base in 0.0f64..=1.0,
        multiplier in 0.0f64..50.0,
    ) {
        let mut params = FinancialParameters {
            base_breach_probability: base,
            ..FinancialParameters::default()
        };
        for control in &controls {
            params
                .family_probability_multipliers
                .insert(control.family_code.clone(), multiplier);
        }
        let probability = roi::breach_probability(&controls, &params);
        prop_assert!((0.0..=1.0).contains(&probability));
    }

    #[test]
    fn scoring_is_deterministic(control in control_strategy()) {
        let config = ScoringConfig::default();
        let first = risk::score(&control, as_of(), &config);
        let second = risk::score(&control, as_of(), &config);
        prop_assert_eq!(first.risk_score.to_bits(), second.risk_score.to_bits());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn top_risks_is_sorted_and_bounded(
        controls in prop::collection::vec(control_strategy(), 0..30),
        n in 0usize..10,
    ) {
        let ranked = risk::top_risks(&controls, n, as_of(), &ScoringConfig::default());
        prop_assert!(ranked.len() <= n);
        for pair in ranked.iter().zip(ranked.iter().skip(1)) {
            prop_assert!(pair.0.risk_score >= pair.1.risk_score);
        }
    }
}
