use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::EndpointView;
use crate::errors::Result;
use crate::extract::block::strip_comments;
use crate::scoring::{DimensionScore, SoftViolation};

const POINTS_PER_DIAGNOSTIC: usize = 10;

static ANY_USAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*any\b|\bas\s+any\b|<any>").unwrap());

static FUNCTION_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport\s+(?:default\s+)?(?:async\s+)?function\s*([A-Za-z_$][\w$]*)\s*\(([^)]*)\)")
        .unwrap()
});

static ARROW_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport\s+const\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?\(([^)]*)\)").unwrap()
});

/// Type safety: compiler diagnostics first, then source heuristics.
pub fn check_types(view: &EndpointView<'_>) -> Result<DimensionScore> {
    let mut score = DimensionScore::pass();

    match view.type_check {
        Some(outcome) if outcome.is_fatal() => {
            let reason = outcome.diagnostics.first().cloned().unwrap_or_default();
            score.fail_with(0, reason);
            return Ok(score);
        }
        Some(outcome) => {
            let diagnostics = outcome.diagnostics_for(&view.sources.files);
            score.metric("type_errors", diagnostics.len());
            if !diagnostics.is_empty() {
                let remaining = 100usize.saturating_sub(POINTS_PER_DIAGNOSTIC * diagnostics.len());
                score.fail_with(
                    remaining as u8,
                    format!("{} type error(s) in endpoint files", diagnostics.len()),
                );
                score.issues.extend(diagnostics);
            }
        }
        None => score.metric("type_checker", "not run"),
    }

    let logic = strip_comments(&view.sources.logic);
    let any_count = ANY_USAGE.find_iter(&logic).count();
    score.metric("any_usage", any_count);
    if any_count > 0 {
        score.soft(
            SoftViolation::Moderate,
            format!("{} use(s) of the `any` type", any_count),
        );
    }

    let handlers: BTreeSet<String> = view.facts.contract.facts.handlers().into_iter().collect();
    for name in untyped_handlers(&logic, &handlers) {
        score.soft(
            SoftViolation::Minor,
            format!("handler '{}' has untyped parameters", name),
        );
    }

    Ok(score)
}

/// Exported handlers whose parameter list has no type annotation at all
fn untyped_handlers(logic: &str, handlers: &BTreeSet<String>) -> Vec<String> {
    FUNCTION_SIGNATURE
        .captures_iter(logic)
        .chain(ARROW_SIGNATURE.captures_iter(logic))
        .filter(|c| handlers.contains(&c[1]))
        .filter(|c| {
            let params = c[2].trim();
            !params.is_empty() && !params.contains(':')
        })
        .map(|c| c[1].to_string())
        .collect()
}
