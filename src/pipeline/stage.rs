//! Stage abstraction for the validation pipeline.
//!
//! A stage is an isolated unit that inspects the resolved scope and returns a
//! verdict. Stages run strictly in order; state one stage produces for a later
//! one (the type-check outcome, validated records) travels in [`StageContext`].

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use super::scope::ResolvedScope;
use crate::endpoint::EndpointRecord;
use crate::env::ValidationEnv;
use crate::errors::Result;
use crate::typecheck::TypeCheckOutcome;

/// A named step of the pipeline.
pub trait ValidationStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line description for help output
    fn description(&self) -> &'static str;

    /// Whether the stage has anything to do for this scope
    fn applies_to(&self, scope: &ResolvedScope) -> bool {
        let _ = scope;
        true
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome>;
}

/// Verdict of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub passed: bool,
    pub summary: String,
    /// Failing subjects with their first issue
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl StageOutcome {
    pub fn pass(summary: impl Into<String>) -> Self {
        Self {
            passed: true,
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    pub fn fail(summary: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            passed: false,
            summary: summary.into(),
            details,
        }
    }
}

/// Shared state of one pipeline run.
pub struct StageContext<'a> {
    pub env: &'a dyn ValidationEnv,
    pub scope: &'a ResolvedScope,
    pub type_check: Option<TypeCheckOutcome>,
    /// Full records from the compliance stage
    pub records: Vec<EndpointRecord>,
    /// Manifests and reports written during the run
    pub written: Vec<PathBuf>,
}

impl<'a> StageContext<'a> {
    pub fn new(env: &'a dyn ValidationEnv, scope: &'a ResolvedScope) -> Self {
        Self {
            env,
            scope,
            type_check: None,
            records: Vec::new(),
            written: Vec::new(),
        }
    }
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Passed,
    Failed,
    /// Returned an error or panicked
    Crashed,
    /// Not relevant to the scope
    Skipped,
}

/// Timing and verdict of one executed stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    pub name: String,
    pub status: StageStatus,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl StageResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, StageStatus::Failed | StageStatus::Crashed)
    }

    /// `name: 1.25s`
    pub fn format_timing(&self) -> String {
        format!("{}: {:.2}s", self.name, self.duration.as_secs_f64())
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_result_timing_and_json() {
        let result = StageResult {
            name: "lint".to_string(),
            status: StageStatus::Passed,
            duration: Duration::from_millis(1250),
            summary: "2 endpoint(s) clean".to_string(),
            details: Vec::new(),
        };
        assert_eq!(result.format_timing(), "lint: 1.25s");
        assert!(!result.is_failure());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["duration_ms"], 1250);
        assert_eq!(json["status"], "passed");
        assert!(json.get("details").is_none());
    }
}
