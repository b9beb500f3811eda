use once_cell::sync::Lazy;
use regex::Regex;

use super::EndpointView;
use crate::errors::Result;
use crate::extract::block::strip_comments;
use crate::scoring::{completion_ratio, DimensionScore, SoftViolation};

static TRY_CATCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btry\s*\{[\s\S]*?\bcatch\b").unwrap());
static SEMANTIC_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\berror\.\w+\s*\(").unwrap());
static LOGGER_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\blogger\.(?:info|warn|error|debug)\s*\(").unwrap());
static CORRELATION_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brequestId\b").unwrap());
static SANITIZATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsecurity\.input\s*\(|(?i:sanitize)|\.escape\s*\(").unwrap());

/// Code-quality heuristics over the logic file.
pub fn check_quality(view: &EndpointView<'_>) -> Result<DimensionScore> {
    let logic = strip_comments(&view.sources.logic);
    let patterns = view.targets.framework_patterns.clone().unwrap_or_default();
    let mut score = DimensionScore::pass();

    let mut required: Vec<&String> = patterns.required_patterns.iter().collect();
    for pattern in &view.spec.validation_specifics.required_patterns {
        if !required.contains(&pattern) {
            required.push(pattern);
        }
    }
    if !required.is_empty() {
        let missing: Vec<&str> = required
            .iter()
            .filter(|p| !logic.contains(p.as_str()))
            .map(|p| p.as_str())
            .collect();
        let present = required.len() - missing.len();
        let ratio = completion_ratio(present, required.len());
        score.metric("pattern_compliance", format!("{}/{}", present, required.len()));
        if ratio < 100 {
            score.soft(
                SoftViolation::for_compliance_ratio(ratio),
                format!("missing required patterns: {}", missing.join(", ")),
            );
        }
    }

    let handles_errors = TRY_CATCH.is_match(&logic) || SEMANTIC_ERROR.is_match(&logic);
    score.metric("error_handling", handles_errors);
    if !handles_errors {
        score.soft(
            SoftViolation::Significant,
            "no error handling (try/catch or semantic error calls)",
        );
    }

    let structured_logging = LOGGER_CALL.is_match(&logic) && CORRELATION_ID.is_match(&logic);
    score.metric("structured_logging", structured_logging);
    if !structured_logging {
        score.soft(
            SoftViolation::Notable,
            "no structured logger call carrying a requestId",
        );
    }

    if view.spec.is_security_sensitive() {
        let sanitized = SANITIZATION.is_match(&logic)
            || patterns
                .security_patterns
                .iter()
                .any(|p| logic.contains(p.as_str()));
        score.metric("input_sanitization", sanitized);
        if !sanitized {
            score.soft(
                SoftViolation::Serious,
                "security-sensitive endpoint does not sanitize input",
            );
        }
    }

    if !patterns.response_patterns.is_empty()
        && !patterns
            .response_patterns
            .iter()
            .any(|p| logic.contains(p.as_str()))
    {
        score.soft(SoftViolation::Minor, "no recognized response pattern");
    }

    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointFacts, EndpointReconciliation, EndpointSources};
    use crate::scoring::Status;
    use crate::spec::{EndpointSpec, FrameworkPatterns, ValidationTargets};
    use crate::testkit::fixtures;
    use serde_json::json;

    fn score(spec: &EndpointSpec, targets: &ValidationTargets, logic: &str) -> DimensionScore {
        let sources = EndpointSources {
            contract: fixtures::CONTRACT.to_string(),
            logic: logic.to_string(),
            ..Default::default()
        };
        let facts = EndpointFacts::extract(&sources);
        let reconciled = EndpointReconciliation::compute(spec, &sources, &facts);
        let view = EndpointView {
            spec,
            targets,
            sources: &sources,
            facts: &facts,
            reconciled: &reconciled,
            type_check: None,
        };
        check_quality(&view).unwrap()
    }

    #[test]
    fn test_well_formed_logic_passes() {
        let result = score(
            &fixtures::endpoint_spec(),
            &ValidationTargets::default(),
            fixtures::LOGIC,
        );
        assert_eq!(result.status, Status::Pass, "{:?}", result.issues);
    }

    #[test]
    fn test_sanitization_only_checked_when_sensitive() {
        let logic = "export function getUser(req: Request) {\n  try { logger.info('x', { requestId }); } catch (e) {}\n}";
        let plain = score(&EndpointSpec::default(), &ValidationTargets::default(), logic);
        assert_eq!(plain.status, Status::Pass);
        assert!(!plain.metrics.contains_key("input_sanitization"));

        let mut sensitive = EndpointSpec::default();
        sensitive.validation_specifics.security_requirements = Some(json!(["input validation"]));
        let flagged = score(&sensitive, &ValidationTargets::default(), logic);
        assert_eq!(flagged.status, Status::Warn);
        assert_eq!(flagged.score, 70);
    }

    #[test]
    fn test_required_pattern_tiers() {
        let targets = ValidationTargets {
            framework_patterns: Some(FrameworkPatterns {
                required_patterns: vec!["a.get(".into(), "b.get(".into(), "c.get(".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let logic = "try { a.get(); b.get(); } catch (e) { logger.error('x', { requestId }); }";
        let result = score(&EndpointSpec::default(), &targets, logic);
        assert_eq!(result.metrics["pattern_compliance"], "2/3");
        assert_eq!(result.score, 80);
        assert_eq!(result.issues, vec!["missing required patterns: c.get("]);
    }

    #[test]
    fn test_missing_error_handling_and_logging() {
        let result = score(
            &EndpointSpec::default(),
            &ValidationTargets::default(),
            "export const x = 1;",
        );
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.score, 75);
        assert_eq!(result.issues.len(), 2);
    }
}
