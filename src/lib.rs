//! controlmap computes risk, compliance, trend, and remediation-ROI
//! analytics over a population of GRC controls.
//!
//! The engine is a set of pure calculators over immutable snapshots: the
//! caller loads control and audit-history records, passes them in with
//! explicit calibration objects, and gets plain result records back.
//! There is no I/O, no persistence, and no shared mutable state, so
//! independent calls are safe to run in parallel.
//!
//! The four components mirror the questions they answer:
//!
//! - [`risk`]: how risky is each control, each family, and the
//!   organization right now ([`risk::score`], [`risk::summarize`]).
//! - [`trend`]: is posture improving, and when does it cross a target
//!   ([`trend::velocity`], [`trend::analyze`]).
//! - [`roi`]: what is fixing a set of failures worth
//!   ([`roi::calculate`], [`roi::scenario_compare`]).
//! - [`priority`]: in what order should they be fixed
//!   ([`priority::rank`], [`priority::quick_wins`]).

pub mod config;
pub mod core;
pub mod errors;
pub mod priority;
pub mod risk;
pub mod roi;
pub mod trend;

pub use crate::config::{
    ComplianceMode, CostFactors, FinancialParameters, ImpactWeights, RemediationHours,
    ScoringConfig, StatusMultipliers, TrendConfig, TypeFactors,
};
pub use crate::core::{
    BusinessImpact, ComplianceSummary, Control, ControlStatus, ControlType, HistoricalSnapshot,
    PaybackPeriod, PriorityResult, RemediationCost, RiskFactors, RiskScoreResult, RoiPercentage,
    RoiResult, StatusCounts, TargetProjection, TrendDirection, TrendResult,
};
pub use crate::errors::EngineError;
