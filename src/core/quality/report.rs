//! Quality reporting structures
//!
//! Row-level rejections and rule-check outcomes travel in these types
//! rather than as errors. A stage hands its report to the runner; only a
//! failed fatal check turns into a run-level error.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::errors::MercatorError;

/// Why a source row was excluded from the fact table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RejectReason {
    /// Quantity missing or non-numeric
    MissingQuantity,
    /// Unit price missing or non-numeric
    MissingUnitPrice,
    /// Unit price below zero
    NegativeUnitPrice,
    /// Invoice number blank
    BlankInvoiceNo,
    /// Stock code blank
    BlankStockCode,
    /// Stock code absent from the product dimension
    UnknownProduct,
}

impl RejectReason {
    /// Stable snake_case label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingQuantity => "missing_quantity",
            RejectReason::MissingUnitPrice => "missing_unit_price",
            RejectReason::NegativeUnitPrice => "negative_unit_price",
            RejectReason::BlankInvoiceNo => "blank_invoice_no",
            RejectReason::BlankStockCode => "blank_stock_code",
            RejectReason::UnknownProduct => "unknown_product",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One excluded source row, with enough context to find it again
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// Source file line number
    pub line_no: usize,

    /// Invoice number as recorded (possibly blank)
    pub invoice_no: String,

    /// Stock code as recorded (possibly blank)
    pub stock_code: String,

    /// Why the row was excluded
    pub reason: RejectReason,
}

/// Accumulator for row-level rejections
///
/// Keeps a full count per reason but only a bounded sample of actual
/// rows, so a pathological input cannot balloon the report.
#[derive(Debug, Clone, Serialize)]
pub struct RejectionLog {
    counts: BTreeMap<RejectReason, usize>,
    samples: BTreeMap<RejectReason, Vec<RowRejection>>,
    max_samples: usize,
    total: usize,
}

impl RejectionLog {
    /// Creates an empty log keeping at most `max_samples` rows per reason
    pub fn new(max_samples: usize) -> Self {
        Self {
            counts: BTreeMap::new(),
            samples: BTreeMap::new(),
            max_samples,
            total: 0,
        }
    }

    /// Records one rejected row
    pub fn record(&mut self, rejection: RowRejection) {
        let reason = rejection.reason;
        *self.counts.entry(reason).or_insert(0) += 1;
        self.total += 1;

        let samples = self.samples.entry(reason).or_default();
        if samples.len() < self.max_samples {
            samples.push(rejection);
        }
    }

    /// Total rejected rows across all reasons
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rejected rows for one reason
    pub fn count(&self, reason: RejectReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    /// Counts per reason, ordered by reason
    pub fn counts(&self) -> &BTreeMap<RejectReason, usize> {
        &self.counts
    }

    /// Sampled rows for one reason (at most `max_samples`)
    pub fn samples(&self, reason: RejectReason) -> &[RowRejection] {
        self.samples.get(&reason).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Logs one warn line per reason with its count and sample lines
    pub fn log_summary(&self, stage: &str) {
        for (reason, count) in &self.counts {
            let sample_lines: Vec<usize> = self
                .samples(*reason)
                .iter()
                .map(|r| r.line_no)
                .collect();
            tracing::warn!(
                stage,
                reason = reason.as_str(),
                count,
                sample_lines = ?sample_lines,
                "Rows excluded"
            );
        }
    }
}

impl Default for RejectionLog {
    fn default() -> Self {
        Self::new(5)
    }
}

/// How a failed check affects the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Failure aborts the run before the next stage
    Fatal,
    /// Failure is logged and reported only
    Informational,
}

/// Outcome of one validation rule
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Rule name, e.g. `fct_sales.product_fk`
    pub rule: String,

    /// Whether a failure gates the run
    pub severity: Severity,

    /// True when the rule held
    pub passed: bool,

    /// Rows violating the rule
    pub affected_rows: usize,

    /// Bounded sample of offending keys
    pub sample_keys: Vec<String>,
}

impl CheckResult {
    /// A passing result for `rule`
    pub fn pass(rule: impl Into<String>, severity: Severity) -> Self {
        Self {
            rule: rule.into(),
            severity,
            passed: true,
            affected_rows: 0,
            sample_keys: Vec::new(),
        }
    }

    /// A failing result for `rule`
    pub fn fail(
        rule: impl Into<String>,
        severity: Severity,
        affected_rows: usize,
        sample_keys: Vec<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            passed: false,
            affected_rows,
            sample_keys,
        }
    }
}

/// All check outcomes for one stage
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Stage the checks ran after, e.g. `dimensions`
    pub stage: String,

    /// Individual rule outcomes
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    /// Creates an empty report for `stage`
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            checks: Vec::new(),
        }
    }

    /// Appends one rule outcome
    pub fn push(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// True when no fatal check failed
    pub fn passed(&self) -> bool {
        !self
            .checks
            .iter()
            .any(|c| !c.passed && c.severity == Severity::Fatal)
    }

    /// Fatal failures, if any
    pub fn fatal_failures(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.severity == Severity::Fatal)
            .collect()
    }

    /// Logs every outcome; failures at warn, passes at debug
    pub fn log_summary(&self) {
        for check in &self.checks {
            if check.passed {
                tracing::debug!(stage = %self.stage, rule = %check.rule, "Check passed");
            } else {
                tracing::warn!(
                    stage = %self.stage,
                    rule = %check.rule,
                    severity = ?check.severity,
                    affected_rows = check.affected_rows,
                    sample_keys = ?check.sample_keys,
                    "Check failed"
                );
            }
        }
    }

    /// Converts fatal failures into a run-level error
    ///
    /// # Errors
    ///
    /// Returns [`MercatorError::Validation`] naming every failed fatal
    /// rule when at least one fatal check failed.
    pub fn ensure_passed(&self) -> Result<(), MercatorError> {
        let failures = self.fatal_failures();
        if failures.is_empty() {
            return Ok(());
        }
        let rules: Vec<String> = failures
            .iter()
            .map(|c| format!("{} ({} rows)", c.rule, c.affected_rows))
            .collect();
        Err(MercatorError::Validation(format!(
            "stage '{}' failed fatal checks: {}",
            self.stage,
            rules.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(line_no: usize, reason: RejectReason) -> RowRejection {
        RowRejection {
            line_no,
            invoice_no: "536365".to_string(),
            stock_code: "85123A".to_string(),
            reason,
        }
    }

    #[test]
    fn test_rejection_log_counts_everything() {
        let mut log = RejectionLog::new(2);
        for line in 2..12 {
            log.record(rejection(line, RejectReason::MissingQuantity));
        }
        log.record(rejection(50, RejectReason::BlankInvoiceNo));

        assert_eq!(log.total(), 11);
        assert_eq!(log.count(RejectReason::MissingQuantity), 10);
        assert_eq!(log.count(RejectReason::BlankInvoiceNo), 1);
        assert_eq!(log.count(RejectReason::UnknownProduct), 0);
    }

    #[test]
    fn test_rejection_log_bounds_samples() {
        let mut log = RejectionLog::new(3);
        for line in 2..20 {
            log.record(rejection(line, RejectReason::MissingUnitPrice));
        }

        let samples = log.samples(RejectReason::MissingUnitPrice);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].line_no, 2);
        assert_eq!(samples[2].line_no, 4);
        // count is unaffected by the bound
        assert_eq!(log.count(RejectReason::MissingUnitPrice), 18);
    }

    #[test]
    fn test_validation_report_gating() {
        let mut report = ValidationReport::new("facts");
        report.push(CheckResult::pass("fct_sales.product_fk", Severity::Fatal));
        assert!(report.passed());
        assert!(report.ensure_passed().is_ok());

        report.push(CheckResult::fail(
            "fct_sales.unique_business_key",
            Severity::Fatal,
            2,
            vec!["536365/85123A/1".to_string()],
        ));
        assert!(!report.passed());
        let err = report.ensure_passed().unwrap_err();
        assert!(err.to_string().contains("unique_business_key"));
    }

    #[test]
    fn test_informational_failure_does_not_gate() {
        let mut report = ValidationReport::new("aggregates");
        report.push(CheckResult::fail(
            "agg_country_day.revenue_reconciles",
            Severity::Informational,
            1,
            Vec::new(),
        ));
        assert!(report.passed());
        assert!(report.ensure_passed().is_ok());
        assert_eq!(report.fatal_failures().len(), 0);
    }

    #[test]
    fn test_reject_reason_labels() {
        assert_eq!(RejectReason::MissingQuantity.as_str(), "missing_quantity");
        assert_eq!(
            RejectReason::NegativeUnitPrice.to_string(),
            "negative_unit_price"
        );
    }
}
