//! Run summary
//!
//! This module provides the summary a completed run hands back to the
//! orchestrator: per-stage row counts and timings, every check outcome,
//! and the row-level exclusions. A summary only exists for runs whose
//! fatal gates all passed.

use std::time::Duration;

use serde::Serialize;

use super::runner::RunMode;
use crate::core::quality::report::{CheckResult, RejectionLog, ValidationReport};
use crate::domain::Result;

/// One completed stage
#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    /// Stage name, e.g. `facts`
    pub stage: String,

    /// Rows written to the store by this stage (or produced, on a dry run)
    pub rows_written: usize,

    /// Wall-clock stage duration in milliseconds
    pub duration_ms: u64,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Mode the run executed under
    pub mode: RunMode,

    /// True when no table was written
    pub dry_run: bool,

    /// Stages in execution order
    pub stages: Vec<StageOutcome>,

    /// Every validation rule outcome, passed and failed
    pub checks: Vec<CheckResult>,

    /// Row-level exclusions from the fact build
    pub rejections: RejectionLog,

    /// Exact duplicate lines collapsed in the fact build
    pub collapsed_duplicates: usize,

    /// Total run duration in milliseconds, set when the run finishes
    pub duration_ms: Option<u64>,
}

impl RunSummary {
    /// Creates an empty summary for a starting run
    pub fn new(mode: RunMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            stages: Vec::new(),
            checks: Vec::new(),
            rejections: RejectionLog::default(),
            collapsed_duplicates: 0,
            duration_ms: None,
        }
    }

    /// Records one completed stage
    pub fn record_stage(&mut self, stage: impl Into<String>, rows_written: usize, took: Duration) {
        self.stages.push(StageOutcome {
            stage: stage.into(),
            rows_written,
            duration_ms: took.as_millis() as u64,
        });
    }

    /// Copies a stage report's check outcomes into the summary
    pub fn record_checks(&mut self, report: &ValidationReport) {
        self.checks.extend(report.checks.iter().cloned());
    }

    /// Sets the total duration
    pub fn with_duration(mut self, took: Duration) -> Self {
        self.duration_ms = Some(took.as_millis() as u64);
        self
    }

    /// Total rows written across all stages
    pub fn rows_written(&self) -> usize {
        self.stages.iter().map(|s| s.rows_written).sum()
    }

    /// Checks that did not pass (informational; fatal ones abort the run)
    pub fn failed_checks(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// True when nothing was excluded, collapsed or flagged
    pub fn is_clean(&self) -> bool {
        self.rejections.total() == 0 && self.collapsed_duplicates == 0 && self.failed_checks() == 0
    }

    /// Renders the summary as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Logs the run outcome with per-stage details
    pub fn log_summary(&self) {
        tracing::info!(
            mode = %self.mode,
            dry_run = self.dry_run,
            stages = self.stages.len(),
            rows_written = self.rows_written(),
            rows_rejected = self.rejections.total(),
            collapsed_duplicates = self.collapsed_duplicates,
            checks_failed = self.failed_checks(),
            duration_ms = self.duration_ms,
            "Run complete"
        );

        for stage in &self.stages {
            tracing::debug!(
                stage = %stage.stage,
                rows_written = stage.rows_written,
                duration_ms = stage.duration_ms,
                "Stage complete"
            );
        }

        for check in self.checks.iter().filter(|c| !c.passed) {
            tracing::warn!(
                rule = %check.rule,
                affected_rows = check.affected_rows,
                "Check failed during run"
            );
        }
    }
}
