//! Pipeline orchestration
//!
//! This module provides the stage sequencer and the run summary it
//! returns. Builders stay pure; everything that touches the store or the
//! raw files happens here.

pub mod runner;
pub mod summary;

pub use runner::{PipelineRunner, RunMode, SourcePaths};
pub use summary::{RunSummary, StageOutcome};
