use super::scope_files;
use crate::errors::Result;
use crate::pipeline::stage::{StageContext, StageOutcome, ValidationStage};
use crate::typecheck::TypeCheckStatus;

/// Runs the external type checker over the in-scope artifacts.
///
/// The outcome is kept in the context so the compliance stage can score
/// the types dimension without a second compiler run.
pub struct TypeCheckStage;

impl ValidationStage for TypeCheckStage {
    fn name(&self) -> &'static str {
        "typecheck"
    }

    fn description(&self) -> &'static str {
        "Type-check contract, logic and test files"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let files = scope_files(ctx.env, ctx.scope);
        if files.is_empty() {
            return Ok(StageOutcome::pass("no artifacts to type-check"));
        }

        let outcome = ctx.env.type_checker().run(&files)?.scoped_to(&files);
        tracing::debug!(
            files = files.len(),
            diagnostics = outcome.diagnostics.len(),
            "Type check finished"
        );

        let verdict = match outcome.status {
            TypeCheckStatus::Clean => {
                StageOutcome::pass(format!("{} file(s) type-check cleanly", files.len()))
            }
            TypeCheckStatus::Diagnostics => StageOutcome::fail(
                format!("{} type error(s) in scope", outcome.diagnostics.len()),
                outcome.diagnostics.clone(),
            ),
            TypeCheckStatus::Timeout | TypeCheckStatus::Unparseable => StageOutcome::fail(
                "type checker produced no verdict",
                outcome.diagnostics.clone(),
            ),
        };
        ctx.type_check = Some(outcome);
        Ok(verdict)
    }
}
