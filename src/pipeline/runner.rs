use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::registry::StageRegistry;
use super::scope::ValidationScope;
use super::stage::{StageContext, StageResult, StageStatus, ValidationStage};
use crate::endpoint::EndpointRecord;
use crate::env::ValidationEnv;
use crate::errors::{Error, Result};
use crate::scoring::guard::panic_message;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub scope: ValidationScope,
    pub stages: Vec<StageResult>,
    /// Stages left unexecuted after a failure
    pub not_run: Vec<String>,
    #[serde(rename = "total_ms", serialize_with = "serialize_millis")]
    pub total: Duration,
    pub endpoints: Vec<EndpointRecord>,
    pub written: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn success(&self) -> bool {
        self.failed_stage().is_none()
    }

    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.is_failure())
    }

    /// `Err(StageFailure)` naming the first failing stage
    pub fn ensure_success(&self) -> Result<()> {
        match self.failed_stage() {
            None => Ok(()),
            Some(stage) => Err(Error::stage_failure(&stage.name, &stage.summary)),
        }
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Runs named stages in order over one scope, stopping at the first failure.
pub struct PipelineRunner<'a> {
    env: &'a dyn ValidationEnv,
    registry: StageRegistry,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(env: &'a dyn ValidationEnv) -> Self {
        Self {
            env,
            registry: StageRegistry::standard(),
        }
    }

    pub fn with_registry(mut self, registry: StageRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Resolve the scope once, then execute `stage_names` fail-fast.
    ///
    /// Unknown stage names and unresolvable scopes are errors before any
    /// stage runs. A stage that fails, errors or panics ends the run; its
    /// result says which.
    pub fn run(&self, scope: &ValidationScope, stage_names: &[String]) -> Result<PipelineReport> {
        let stages = self.registry.select(stage_names)?;
        let resolved = scope.resolve(&self.env.spec_source())?;
        let reporter = self.env.reporter();
        tracing::info!(
            scope = %scope,
            endpoints = resolved.endpoint_count(),
            stages = stages.len(),
            "Pipeline started"
        );

        let started = Instant::now();
        let mut ctx = StageContext::new(self.env, &resolved);
        let mut results = Vec::with_capacity(stages.len());
        let mut not_run = Vec::new();

        for (i, stage) in stages.iter().enumerate() {
            if !stage.applies_to(&resolved) {
                results.push(StageResult {
                    name: stage.name().to_string(),
                    status: StageStatus::Skipped,
                    duration: Duration::ZERO,
                    summary: format!("not relevant to {}", scope),
                    details: Vec::new(),
                });
                continue;
            }

            reporter.stage_started(stage.name());
            let result = execute(*stage, &mut ctx);
            reporter.stage_finished(stage.name(), !result.is_failure(), result.duration);

            let failed = result.is_failure();
            if failed {
                reporter.error(&format!("Stage '{}' failed: {}", result.name, result.summary));
            }
            results.push(result);
            if failed {
                not_run = stages[i + 1..].iter().map(|s| s.name().to_string()).collect();
                break;
            }
        }

        let report = PipelineReport {
            scope: scope.clone(),
            stages: results,
            not_run,
            total: started.elapsed(),
            endpoints: ctx.records,
            written: ctx.written,
        };
        tracing::info!(
            success = report.success(),
            elapsed_ms = report.total.as_millis() as u64,
            "Pipeline finished"
        );
        Ok(report)
    }
}

/// Run one stage in isolation, converting errors and panics into a crashed result
fn execute(stage: &dyn ValidationStage, ctx: &mut StageContext<'_>) -> StageResult {
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage.run(ctx)));
    let duration = started.elapsed();
    let name = stage.name().to_string();

    match outcome {
        Ok(Ok(outcome)) => StageResult {
            name,
            status: if outcome.passed {
                StageStatus::Passed
            } else {
                StageStatus::Failed
            },
            duration,
            summary: outcome.summary,
            details: outcome.details,
        },
        Ok(Err(e)) => {
            tracing::error!(stage = stage.name(), error = %e, "Stage returned an error");
            StageResult {
                name,
                status: StageStatus::Crashed,
                duration,
                summary: format!("stage error: {}", e),
                details: Vec::new(),
            }
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(stage = stage.name(), %message, "Stage panicked");
            StageResult {
                name,
                status: StageStatus::Crashed,
                duration,
                summary: format!("stage crashed: {}", message),
                details: Vec::new(),
            }
        }
    }
}
