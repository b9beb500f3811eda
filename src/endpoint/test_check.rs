use regex::Regex;

use super::EndpointView;
use crate::errors::{Error, Result};
use crate::scoring::{completion_ratio, DimensionScore, SoftViolation};

/// Test validation: declared test cases against implemented ones.
///
/// An endpoint that declares no tests is vacuously complete and only earns a
/// warning.
pub fn check_tests(view: &EndpointView<'_>) -> Result<DimensionScore> {
    let r = &view.reconciled.tests;
    let test_text = view.sources.test_text();
    let mut score = DimensionScore::pass();

    if r.expected == 0 {
        score.warn("no tests declared");
    } else if view.sources.test.is_none() {
        score.fail_with(0, format!("test file not found: {}", view.sources.test_path));
    }

    score.fail_missing(
        r.matched,
        r.expected,
        r.missing.iter().map(|name| format!("test not implemented: {}", name)),
    );
    score.metric("tests", r.fraction());
    score.metric("declared_by", view.reconciled.tests_declared_by);

    if !r.extra.is_empty() {
        score.metric("extra_tests", r.extra.len());
        for name in &r.extra {
            score.note(format!("undeclared test: {}", name));
        }
    }

    for pattern in &view.spec.validation_specifics.required_test_patterns {
        if !test_text.contains(pattern.as_str()) {
            score.soft(
                SoftViolation::Notable,
                format!("required test pattern '{}' not found", pattern),
            );
        }
    }

    let target = view
        .spec
        .coverage_target()
        .or(view.targets.required_coverage);
    if let Some(target) = target {
        let estimate = estimated_coverage(view, test_text)?;
        score.metric("estimated_coverage", format!("{}%", estimate));
        score.metric("coverage_target", format!("{}%", target));
        if u32::from(estimate) < target {
            score.soft(
                SoftViolation::Significant,
                format!("estimated coverage {}% below target {}%", estimate, target),
            );
        }
    }

    Ok(score)
}

/// Share of contract routes whose handler name or path the test text mentions
fn estimated_coverage(view: &EndpointView<'_>, test_text: &str) -> Result<u8> {
    let routes = &view.facts.contract.facts.routes;
    let routes = if routes.is_empty() {
        &view.spec.contract.routes
    } else {
        routes
    };

    let mut covered = 0;
    for (route, handler) in routes {
        let handler_re = Regex::new(&format!(r"\b{}\b", regex::escape(handler)))
            .map_err(|e| Error::scoring("test_validation", e.to_string()))?;
        let path = route.split_whitespace().last().unwrap_or(route);
        if handler_re.is_match(test_text) || test_text.contains(path) {
            covered += 1;
        }
    }
    Ok(completion_ratio(covered, routes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointFacts, EndpointReconciliation, EndpointSources};
    use crate::scoring::Status;
    use crate::spec::{EndpointSpec, ValidationTargets};
    use crate::testkit::fixtures;
    use indoc::indoc;

    fn score(spec: &EndpointSpec, contract: &str, test: Option<&str>) -> DimensionScore {
        let sources = EndpointSources {
            contract: contract.to_string(),
            logic: fixtures::LOGIC.to_string(),
            test: test.map(str::to_string),
            test_path: "src/features/users/get/get.test.ts".to_string(),
            ..Default::default()
        };
        let facts = EndpointFacts::extract(&sources);
        let reconciled = EndpointReconciliation::compute(spec, &sources, &facts);
        let targets = ValidationTargets::default();
        let view = EndpointView {
            spec,
            targets: &targets,
            sources: &sources,
            facts: &facts,
            reconciled: &reconciled,
            type_check: None,
        };
        check_tests(&view).unwrap()
    }

    #[test]
    fn test_zero_declared_tests_is_vacuous() {
        let contract = "export const CONTRACT = { routes: {}, tests: [] };";
        let result = score(&EndpointSpec::default(), contract, Some(""));
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.score, 100);
        assert_eq!(result.issues, vec!["no tests declared"]);
    }

    #[test]
    fn test_normalized_names_match() {
        let contract = r#"export const CONTRACT = { tests: ["Returns  404   when missing"] };"#;
        let test = "it('returns 404 when missing', () => {});";
        let result = score(&EndpointSpec::default(), contract, Some(test));
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.metrics["tests"], "1/1");
    }

    #[test]
    fn test_missing_test_fails_and_extra_is_informational() {
        let contract = "export const CONTRACT = { tests: ['returns user', 'returns 404'] };";
        let test = indoc! {"
            test('returns user', () => {});
            test('handles timeouts', () => {});
        "};
        let result = score(&EndpointSpec::default(), contract, Some(test));
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.score, 50);
        assert_eq!(result.issues, vec!["test not implemented: returns 404"]);
        assert_eq!(result.metrics["extra_tests"], "1");
        assert_eq!(result.warnings, vec!["undeclared test: handles timeouts"]);
    }

    #[test]
    fn test_missing_test_file_with_declared_tests() {
        let contract = "export const CONTRACT = { tests: ['returns user'] };";
        let result = score(&EndpointSpec::default(), contract, None);
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_spec_tests_used_when_contract_declares_none() {
        let result = score(&fixtures::endpoint_spec(), "export const CONTRACT = {};", Some(fixtures::TEST));
        assert_eq!(result.metrics["declared_by"], "specification");
        assert_eq!(result.status, Status::Pass, "{:?}", result.issues);
    }
}
