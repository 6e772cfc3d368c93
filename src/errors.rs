//! Error taxonomy for the analytics engine.
//!
//! Every error is local to a single call and carries enough structure
//! (which control, which field, which bound) to log or display without
//! re-derivation. The engine performs no I/O, so there are no retryable
//! or partial-failure variants; batch operations report per-item
//! `Result`s instead of aborting.
//!
//! Divisions that have a documented sentinel (zero remediation cost,
//! zero active controls, non-positive velocity) resolve to that sentinel
//! in the result types and are *not* errors. `DegenerateDivision` is
//! reserved for divisions the contract defines no sentinel for, such as
//! a trend series whose snapshots all share one timestamp.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum EngineError {
    /// A supplied configuration or control field is outside its documented
    /// domain. Raised eagerly at the start of an operation.
    #[error("invalid configuration: {field} = {value}, expected {expected}")]
    InvalidConfiguration {
        field: String,
        value: f64,
        expected: &'static str,
    },

    /// A trend operation was invoked with fewer snapshots than it needs.
    /// Recoverable by supplying more history.
    #[error("insufficient data for {subject}: have {actual} snapshot(s), need at least {required}")]
    InsufficientData {
        subject: String,
        required: usize,
        actual: usize,
    },

    /// A division had no defined value and no documented sentinel.
    #[error("degenerate division in {operation}: {detail}")]
    DegenerateDivision {
        operation: &'static str,
        detail: String,
    },
}

impl EngineError {
    /// Shorthand for the common out-of-domain check.
    pub(crate) fn out_of_domain(
        field: impl Into<String>,
        value: f64,
        expected: &'static str,
    ) -> Self {
        EngineError::InvalidConfiguration {
            field: field.into(),
            value,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_with_structured_detail() {
        let err = EngineError::out_of_domain("discount_rate", 1.2, "a rate in [0, 1)");
        assert_eq!(
            err.to_string(),
            "invalid configuration: discount_rate = 1.2, expected a rate in [0, 1)"
        );

        let err = EngineError::InsufficientData {
            subject: "series for AC-2".into(),
            required: 2,
            actual: 0,
        };
        assert!(err.to_string().contains("AC-2"));
        assert!(err.to_string().contains("need at least 2"));
    }
}
