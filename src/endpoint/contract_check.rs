use regex::Regex;
use std::fmt;

use super::EndpointView;
use crate::errors::{Error, Result};
use crate::reconcile::Reconciliation;
use crate::scoring::{DimensionScore, SoftViolation};

#[derive(Default)]
struct Tally {
    matched: usize,
    expected: usize,
    missing: Vec<String>,
}

impl Tally {
    fn add<T: fmt::Display>(&mut self, result: &Reconciliation<T>, what: &str) {
        self.matched += result.matched;
        self.expected += result.expected;
        self.missing
            .extend(result.missing.iter().map(|item| format!("{}: {}", what, item)));
    }
}

fn warn_extras<T: fmt::Display>(score: &mut DimensionScore, result: &Reconciliation<T>, what: &str) {
    for item in &result.extra {
        score.soft(SoftViolation::Minor, format!("warning: {}: {}", what, item));
    }
}

/// Contract compliance: specification against contract, then contract
/// against implementation.
pub fn check_contract(view: &EndpointView<'_>) -> Result<DimensionScore> {
    let r = view.reconciled;
    let mut score = DimensionScore::pass();
    let mut tally = Tally::default();

    tally.add(&r.spec_routes, "route in specification but not in contract");
    tally.add(&r.spec_imports, "import in specification but not in contract");
    tally.add(&r.spec_exports, "export required by specification missing from logic");
    tally.add(&r.handlers, "handler not exported by logic");
    tally.add(&r.imports, "contract import not used by logic");
    tally.add(&r.helpers, "helper file missing");
    tally.add(&r.publishes, "event never published");
    tally.add(&r.subscribes, "event never subscribed");

    score.fail_missing(tally.matched, tally.expected, tally.missing);

    warn_extras(&mut score, &r.spec_routes, "contract route not in specification");
    warn_extras(&mut score, &r.handlers, "logic exports undeclared symbol");
    warn_extras(&mut score, &r.imports, "logic imports undeclared module");
    warn_extras(&mut score, &r.publishes, "logic publishes undeclared event");
    warn_extras(&mut score, &r.subscribes, "logic subscribes to undeclared event");

    for module in &view.facts.contract.facts.imports.framework {
        if !has_init_call(&view.sources.logic, module)? {
            score.soft(
                SoftViolation::Moderate,
                format!("no initialization call for framework module '{}'", module),
            );
        }
    }

    let statements = &view.facts.contract.import_statements;
    if !statements.is_empty() {
        score.soft(
            SoftViolation::Moderate,
            format!(
                "contract must be pure data but has {} import statement(s)",
                statements.len()
            ),
        );
    }

    score.metric("spec_routes", r.spec_routes.fraction());
    score.metric("handlers", r.handlers.fraction());
    score.metric("imports", r.imports.fraction());
    score.metric("exports", r.spec_exports.fraction());
    if r.helpers.expected > 0 {
        score.metric("helpers", r.helpers.fraction());
    }
    if r.publishes.expected + r.subscribes.expected > 0 {
        score.metric(
            "events",
            format!(
                "{}/{}",
                r.publishes.matched + r.subscribes.matched,
                r.publishes.expected + r.subscribes.expected
            ),
        );
    }

    Ok(score)
}

/// Last path segment of a module, e.g. `auth` for `@scope/kit/auth`
fn short_name(module: &str) -> &str {
    module.rsplit('/').next().unwrap_or(module)
}

/// `auth.get(`, `authClass.init(`, `utility.create(` and similar
fn has_init_call(logic: &str, module: &str) -> Result<bool> {
    let name = short_name(module);
    if name.is_empty() {
        return Ok(true);
    }
    let pattern = format!(
        r"(?i)\b{}(?:Class)?\s*\.\s*(?:get|init|create)\s*\(",
        regex::escape(name)
    );
    let re = Regex::new(&pattern)
        .map_err(|e| Error::scoring("contract_compliance", format!("bad module pattern: {}", e)))?;
    Ok(re.is_match(logic))
}
