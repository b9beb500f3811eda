use super::validate_scope;
use crate::errors::Result;
use crate::pipeline::scope::ResolvedScope;
use crate::pipeline::stage::{StageContext, StageOutcome, ValidationStage};
use crate::scoring::{Dimension, Status};

/// Scores a single dimension for every in-scope endpoint.
///
/// Fails when any endpoint fails the dimension outright or is missing a
/// required artifact. Warnings never fail the stage.
pub struct DimensionStage {
    name: &'static str,
    description: &'static str,
    dimension: Dimension,
}

impl DimensionStage {
    pub fn lint() -> Self {
        Self {
            name: "lint",
            description: "Style checks on contract and logic files",
            dimension: Dimension::LintValidation,
        }
    }

    pub fn contract() -> Self {
        Self {
            name: "contract",
            description: "Specification, contract and implementation agree",
            dimension: Dimension::ContractCompliance,
        }
    }

    pub fn test() -> Self {
        Self {
            name: "test",
            description: "Declared test cases are implemented",
            dimension: Dimension::TestValidation,
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }
}

impl ValidationStage for DimensionStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn applies_to(&self, scope: &ResolvedScope) -> bool {
        scope.dimensions().contains(&self.dimension)
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let reporter = ctx.env.reporter();
        let features = validate_scope(ctx.env, ctx.scope, &[self.dimension], ctx.type_check.as_ref());

        let mut checked = 0;
        let mut warned = 0;
        let mut failures = Vec::new();
        for validated in features.iter().flat_map(|f| f.endpoints.iter()) {
            let record = &validated.record;
            checked += 1;
            match record.dimension(self.dimension) {
                None => {
                    let reason = record.blocking_issues.join("; ");
                    reporter.check_fail(&record.key(), &reason);
                    failures.push(format!("{}: {}", record.key(), reason));
                }
                Some(score) if score.status == Status::Fail => {
                    let first = score.issues.first().cloned().unwrap_or_default();
                    reporter.check_fail(&record.key(), &first);
                    failures.push(format!("{}: {}", record.key(), first));
                }
                Some(score) => {
                    if score.status == Status::Warn {
                        warned += 1;
                    }
                    reporter.check_pass(
                        &record.key(),
                        &format!("{} {} ({})", self.dimension.label(), score.status, score.score),
                    );
                }
            }
        }

        if failures.is_empty() {
            Ok(StageOutcome::pass(format!(
                "{} endpoint(s) checked, {} with warnings",
                checked, warned
            )))
        } else {
            Ok(StageOutcome::fail(
                format!("{} of {} endpoint(s) failed {}", failures.len(), checked, self.dimension),
                failures,
            ))
        }
    }
}
