//! Calibration objects for the analytics engine.
//!
//! Every magic number lives here, supplied by the caller (typically an
//! external configuration loader) and validated eagerly before any
//! computation. The engine treats all of these as immutable after
//! construction; sharing one instance across threads is safe.

use crate::core::{BusinessImpact, ControlStatus, ControlType, RemediationCost};
use crate::errors::EngineError;
use im::HashMap;
use serde::{Deserialize, Serialize};

fn check(
    field: impl Into<String>,
    value: f64,
    ok: bool,
    expected: &'static str,
) -> Result<(), EngineError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::out_of_domain(field, value, expected))
    }
}

/// Risk multiplier per control status. `not_applicable` must stay 0 for
/// the short-circuit invariant to hold, but that is a calibration choice
/// the validator enforces rather than a hardcoded branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusMultipliers {
    pub fail: f64,
    pub not_tested: f64,
    pub warn: f64,
    pub pass: f64,
    pub not_applicable: f64,
}

impl Default for StatusMultipliers {
    fn default() -> Self {
        Self {
            fail: 3.0,
            not_tested: 2.0,
            warn: 1.5,
            pass: 0.1,
            not_applicable: 0.0,
        }
    }
}

impl StatusMultipliers {
    pub fn for_status(&self, status: ControlStatus) -> f64 {
        match status {
            ControlStatus::Fail => self.fail,
            ControlStatus::NotTested => self.not_tested,
            ControlStatus::Warn => self.warn,
            ControlStatus::Pass => self.pass,
            ControlStatus::NotApplicable => self.not_applicable,
        }
    }

    /// Largest multiplier an active control can carry; used for the
    /// worst-case denominator in risk-normalized compliance.
    pub fn worst_active(&self) -> f64 {
        self.fail.max(self.not_tested).max(self.warn).max(self.pass)
    }
}

/// Weight per business impact level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            critical: 2.0,
            high: 1.5,
            medium: 1.0,
            low: 0.5,
        }
    }
}

impl ImpactWeights {
    pub fn for_impact(&self, impact: BusinessImpact) -> f64 {
        match impact {
            BusinessImpact::Critical => self.critical,
            BusinessImpact::High => self.high,
            BusinessImpact::Medium => self.medium,
            BusinessImpact::Low => self.low,
        }
    }

    pub fn worst(&self) -> f64 {
        self.critical.max(self.high).max(self.medium).max(self.low)
    }
}

/// Factor per control type. Preventive controls failing matters more than
/// corrective ones failing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeFactors {
    pub preventive: f64,
    pub detective: f64,
    pub corrective: f64,
}

impl Default for TypeFactors {
    fn default() -> Self {
        Self {
            preventive: 1.2,
            detective: 1.0,
            corrective: 0.8,
        }
    }
}

impl TypeFactors {
    pub fn for_type(&self, control_type: ControlType) -> f64 {
        match control_type {
            ControlType::Preventive => self.preventive,
            ControlType::Detective => self.detective,
            ControlType::Corrective => self.corrective,
        }
    }
}

/// How the organization-level compliance score is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceMode {
    /// Passing controls over active controls. The default.
    #[default]
    PassRate,
    /// 100 x (1 - actual risk / worst-case risk).
    RiskNormalized,
}

/// Calibration for risk scoring and compliance aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub status_multipliers: StatusMultipliers,
    /// Added to the staleness factor per day overdue.
    pub daily_staleness_penalty: f64,
    /// Cap on the staleness factor; >= 1.0.
    pub max_staleness_factor: f64,
    pub impact_weights: ImpactWeights,
    pub type_factors: TypeFactors,
    /// Applied when `control.automated`; manual controls get 1.0.
    pub automation_factor: f64,
    pub compliance_mode: ComplianceMode,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            status_multipliers: StatusMultipliers::default(),
            daily_staleness_penalty: 0.00274,
            max_staleness_factor: 3.0,
            impact_weights: ImpactWeights::default(),
            type_factors: TypeFactors::default(),
            automation_factor: 0.8,
            compliance_mode: ComplianceMode::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let m = &self.status_multipliers;
        for (field, value) in [
            ("status_multipliers.fail", m.fail),
            ("status_multipliers.not_tested", m.not_tested),
            ("status_multipliers.warn", m.warn),
            ("status_multipliers.pass", m.pass),
            ("status_multipliers.not_applicable", m.not_applicable),
        ] {
            check(field, value, value >= 0.0, "a finite multiplier >= 0")?;
        }
        let w = &self.impact_weights;
        for (field, value) in [
            ("impact_weights.critical", w.critical),
            ("impact_weights.high", w.high),
            ("impact_weights.medium", w.medium),
            ("impact_weights.low", w.low),
        ] {
            check(field, value, value >= 0.0, "a finite weight >= 0")?;
        }
        let t = &self.type_factors;
        for (field, value) in [
            ("type_factors.preventive", t.preventive),
            ("type_factors.detective", t.detective),
            ("type_factors.corrective", t.corrective),
        ] {
            check(field, value, value >= 0.0, "a finite factor >= 0")?;
        }
        check(
            "daily_staleness_penalty",
            self.daily_staleness_penalty,
            self.daily_staleness_penalty >= 0.0,
            "a finite penalty >= 0",
        )?;
        check(
            "max_staleness_factor",
            self.max_staleness_factor,
            self.max_staleness_factor >= 1.0,
            "a finite cap >= 1.0",
        )?;
        check(
            "automation_factor",
            self.automation_factor,
            self.automation_factor >= 0.0,
            "a finite factor >= 0",
        )
    }
}

/// Calibration for trend classification. Exposed rather than hardcoded so
/// callers can tune sensitivity per organization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Velocity magnitude below this is treated as flat (points/month).
    pub velocity_epsilon: f64,
    /// Number of status direction reversals at which a series counts as
    /// oscillating. A single dip-and-recover (pass -> fail -> pass) is one
    /// reversal, so the default of 1 flags it.
    pub reversal_threshold: usize,
    /// Minimum snapshots `analyze` requires before reporting a trend.
    pub min_snapshots: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            velocity_epsilon: 0.1,
            reversal_threshold: 1,
            min_snapshots: 2,
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        check(
            "velocity_epsilon",
            self.velocity_epsilon,
            self.velocity_epsilon >= 0.0,
            "a finite epsilon >= 0",
        )?;
        check(
            "min_snapshots",
            self.min_snapshots as f64,
            self.min_snapshots >= 1,
            "at least 1",
        )
    }
}

/// Remediation effort in hours per cost band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemediationHours {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RemediationHours {
    fn default() -> Self {
        Self {
            low: 8.0,
            medium: 40.0,
            high: 120.0,
        }
    }
}

impl RemediationHours {
    pub fn for_cost(&self, cost: RemediationCost) -> f64 {
        match cost {
            RemediationCost::Low => self.low,
            RemediationCost::Medium => self.medium,
            RemediationCost::High => self.high,
        }
    }
}

/// Priority divisors per cost band; cheap fixes rank higher.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostFactors {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for CostFactors {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 2.5,
            high: 5.0,
        }
    }
}

impl CostFactors {
    pub fn for_cost(&self, cost: RemediationCost) -> f64 {
        match cost {
            RemediationCost::Low => self.low,
            RemediationCost::Medium => self.medium,
            RemediationCost::High => self.high,
        }
    }
}

/// Financial calibration for ROI and prioritization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialParameters {
    /// Annual probability of a material breach with current failures.
    pub base_breach_probability: f64,
    /// Per-family probability multipliers; families absent from the map
    /// contribute a multiplier of 1.0.
    pub family_probability_multipliers: HashMap<String, f64>,
    pub expected_breach_cost: f64,
    pub hourly_rate: f64,
    pub remediation_hours: RemediationHours,
    /// Fraction of breach probability remaining after remediation; 0.4
    /// means a 60% reduction.
    pub residual_risk_factor: f64,
    /// Annual discount rate for NPV, [0, 1).
    pub discount_rate: f64,
    /// NPV horizon in years, >= 1.
    pub horizon_years: u32,
    pub remediation_cost_factors: CostFactors,
    /// Risk score above which a cheap, high-impact control is a quick win.
    pub quick_win_risk_threshold: f64,
}

impl Default for FinancialParameters {
    fn default() -> Self {
        Self {
            base_breach_probability: 0.15,
            family_probability_multipliers: HashMap::new(),
            expected_breach_cost: 4_450_000.0,
            hourly_rate: 150.0,
            remediation_hours: RemediationHours::default(),
            residual_risk_factor: 0.4,
            discount_rate: 0.08,
            horizon_years: 3,
            remediation_cost_factors: CostFactors::default(),
            quick_win_risk_threshold: 15.0,
        }
    }
}

impl FinancialParameters {
    pub fn validate(&self) -> Result<(), EngineError> {
        check(
            "base_breach_probability",
            self.base_breach_probability,
            (0.0..=1.0).contains(&self.base_breach_probability),
            "a probability in [0, 1]",
        )?;
        for (family, value) in &self.family_probability_multipliers {
            check(
                format!("family_probability_multipliers[{family}]"),
                *value,
                *value >= 0.0,
                "a finite multiplier >= 0",
            )?;
        }
        check(
            "expected_breach_cost",
            self.expected_breach_cost,
            self.expected_breach_cost >= 0.0,
            "a finite cost >= 0",
        )?;
        check(
            "hourly_rate",
            self.hourly_rate,
            self.hourly_rate >= 0.0,
            "a finite rate >= 0",
        )?;
        let h = &self.remediation_hours;
        for (field, value) in [
            ("remediation_hours.low", h.low),
            ("remediation_hours.medium", h.medium),
            ("remediation_hours.high", h.high),
        ] {
            check(field, value, value >= 0.0, "finite hours >= 0")?;
        }
        check(
            "residual_risk_factor",
            self.residual_risk_factor,
            (0.0..=1.0).contains(&self.residual_risk_factor),
            "a fraction in [0, 1]",
        )?;
        check(
            "discount_rate",
            self.discount_rate,
            (0.0..1.0).contains(&self.discount_rate),
            "a rate in [0, 1)",
        )?;
        check(
            "horizon_years",
            f64::from(self.horizon_years),
            self.horizon_years >= 1,
            "at least 1 year",
        )?;
        let f = &self.remediation_cost_factors;
        for (field, value) in [
            ("remediation_cost_factors.low", f.low),
            ("remediation_cost_factors.medium", f.medium),
            ("remediation_cost_factors.high", f.high),
        ] {
            check(field, value, value > 0.0, "a finite divisor > 0")?;
        }
        check(
            "quick_win_risk_threshold",
            self.quick_win_risk_threshold,
            self.quick_win_risk_threshold >= 0.0,
            "a finite threshold >= 0",
        )
    }
}
