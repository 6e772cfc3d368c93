//! Core data types shared across the scoring, trend, ROI, and
//! prioritization engines.
//!
//! Everything here is a plain in-memory record: inputs are produced by
//! external ingestion/storage collaborators and outputs are handed back to
//! external reporting collaborators. The engine never mutates a `Control`
//! and never serializes anything itself, but every result type derives
//! `Serialize`/`Deserialize` because the result shape is the contract.

use chrono::NaiveDate;
use im::{HashMap, Vector};
use serde::{Deserialize, Serialize};

/// Test outcome of a single governance control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    Pass,
    Warn,
    Fail,
    NotTested,
    NotApplicable,
}

impl ControlStatus {
    /// Active controls participate in compliance denominators;
    /// `NotApplicable` ones do not.
    pub fn is_active(self) -> bool {
        self != ControlStatus::NotApplicable
    }

    /// Statuses that make a control a remediation candidate.
    pub fn is_failing(self) -> bool {
        matches!(self, ControlStatus::Fail | ControlStatus::Warn)
    }

    /// Ordering used for trend direction analysis: lower is better.
    /// `NotApplicable` has no position on this scale and is filtered out
    /// before ranking.
    pub fn severity_rank(self) -> u8 {
        match self {
            ControlStatus::Pass => 0,
            ControlStatus::Warn => 1,
            ControlStatus::NotTested => 2,
            ControlStatus::Fail => 3,
            ControlStatus::NotApplicable => 0,
        }
    }
}

/// Business criticality of the asset or process a control protects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessImpact {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Preventive,
    Detective,
    Corrective,
}

/// Coarse remediation cost band; mapped to hours and currency by
/// `FinancialParameters`, never by the control record itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationCost {
    Low,
    Medium,
    High,
}

/// Current state of one governance control. Read-only to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub status: ControlStatus,
    /// Inherent importance, domain [1.0, 10.0].
    pub weight: f64,
    pub business_impact: BusinessImpact,
    pub control_type: ControlType,
    pub automated: bool,
    pub remediation_cost: RemediationCost,
    pub last_test_date: NaiveDate,
    pub next_test_due: NaiveDate,
    /// Grouping key, e.g. a NIST 800-53 family code.
    pub family_code: String,
}

impl Control {
    /// Whole days past `next_test_due`, never negative. A due date in the
    /// future (or an inverted date pair) yields 0.
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        as_of
            .signed_duration_since(self.next_test_due)
            .num_days()
            .max(0)
    }
}

/// Every multiplier that went into a risk score, recorded by name so a
/// score can be audited or re-derived without re-running the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub status_multiplier: f64,
    pub staleness_factor: f64,
    pub impact_weight: f64,
    pub type_factor: f64,
    pub automation_factor: f64,
    pub days_overdue: i64,
}

/// Result of scoring one control at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreResult {
    pub control_id: String,
    /// >= 0, unbounded above; 0 exactly when the control is not applicable
    /// or every factor zeroes out.
    pub risk_score: f64,
    pub factors: RiskFactors,
    /// The `as_of` date the score was computed against. Derived from the
    /// input, not the wall clock, so identical inputs score identically.
    pub scored_at: NaiveDate,
}

/// Per-status control counts within a population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
    pub not_tested: usize,
    pub not_applicable: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ControlStatus) {
        match status {
            ControlStatus::Pass => self.pass += 1,
            ControlStatus::Warn => self.warn += 1,
            ControlStatus::Fail => self.fail += 1,
            ControlStatus::NotTested => self.not_tested += 1,
            ControlStatus::NotApplicable => self.not_applicable += 1,
        }
    }
}

/// Organization-level compliance aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    /// Controls with status other than `NotApplicable`.
    pub total_active: usize,
    pub status_counts: StatusCounts,
    /// [0, 100], computed in the configured compliance mode.
    pub overall_compliance_score: f64,
    /// Compliance percentage per control family, same mode as the overall.
    pub family_compliance: HashMap<String, f64>,
    /// Highest-risk controls, descending.
    pub top_risks: Vector<RiskScoreResult>,
}

/// One control's status and score at one historical point. Series are
/// append-only and chronologically ordered by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    pub control_id: String,
    pub recorded_at: NaiveDate,
    pub status: ControlStatus,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Degrading,
    Oscillating,
}

/// Time-to-target outcome. `Unreachable` is the defined sentinel for a
/// non-positive velocity with the target still above the current score;
/// it is never reported as a floating-point infinity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetProjection {
    AlreadyMet,
    Months(f64),
    Unreachable,
}

/// Trend analysis over one snapshot series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Score units per month, signed. Least-squares slope.
    pub velocity: f64,
    /// Score at the most recent snapshot.
    pub current_score: f64,
    /// Projection at the requested horizon, clamped to [0, 100].
    pub projected_score: f64,
    pub direction: TrendDirection,
    pub months_to_target: TargetProjection,
}

/// ROI percentage, with the zero-cost case surfaced as a distinct variant
/// instead of a silent `f64::INFINITY`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiPercentage {
    Finite(f64),
    Unbounded,
}

impl RoiPercentage {
    pub fn as_finite(self) -> Option<f64> {
        match self {
            RoiPercentage::Finite(v) => Some(v),
            RoiPercentage::Unbounded => None,
        }
    }
}

/// Payback horizon; `Never` when the risk reduction value is non-positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaybackPeriod {
    Months(f64),
    Never,
}

/// Financial justification for remediating a set of failing controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub risk_exposure_before: f64,
    pub risk_exposure_after: f64,
    pub remediation_cost: f64,
    pub risk_reduction_value: f64,
    pub roi_percentage: RoiPercentage,
    /// Net present value over the configured horizon and discount rate.
    pub npv: f64,
    pub payback_period_months: PaybackPeriod,
}

/// Remediation priority of one failing control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriorityResult {
    pub control_id: String,
    pub priority_score: f64,
    pub risk_score: f64,
    /// 1-based position in the remediation order.
    pub rank: usize,
    /// High risk, low cost, critical/high impact.
    pub quick_win: bool,
}
