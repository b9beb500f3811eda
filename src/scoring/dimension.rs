use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::penalty::{completion_ratio, SoftViolation};

/// One axis of endpoint reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ContractCompliance,
    TestValidation,
    TypesValidation,
    LintValidation,
    CodeQuality,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::ContractCompliance,
        Dimension::TestValidation,
        Dimension::TypesValidation,
        Dimension::LintValidation,
        Dimension::CodeQuality,
    ];

    /// Serialized name used in manifests and weights
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractCompliance => "contract_compliance",
            Self::TestValidation => "test_validation",
            Self::TypesValidation => "types_validation",
            Self::LintValidation => "lint_validation",
            Self::CodeQuality => "code_quality",
        }
    }

    /// Short human label for summaries and issue prefixes
    pub fn label(&self) -> &'static str {
        match self {
            Self::ContractCompliance => "contract",
            Self::TestValidation => "tests",
            Self::TypesValidation => "types",
            Self::LintValidation => "lint",
            Self::CodeQuality => "quality",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        })
    }
}

/// Result of scoring one dimension.
///
/// Scores only ever move down from the ceiling of 100. A hard failure caps
/// the score at a completion ratio and sets `Fail`; a soft violation caps it
/// at a severity ceiling and sets `Warn` unless the dimension already failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub status: Status,
    pub score: u8,
    /// Problems that lowered the status or score
    pub issues: Vec<String>,
    /// Informational notes that never block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Raw audit values such as `"3/3"` fractions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, String>,
}

impl Default for DimensionScore {
    fn default() -> Self {
        Self::pass()
    }
}

impl DimensionScore {
    pub fn pass() -> Self {
        Self {
            status: Status::Pass,
            score: 100,
            issues: Vec::new(),
            warnings: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// A dimension that could not be computed at all
    pub fn crashed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            score: 0,
            issues: vec![message.into()],
            ..Self::pass()
        }
    }

    /// Record missing required items, capping the score at the completion ratio.
    ///
    /// Does nothing when `issues` is empty.
    pub fn fail_missing<I>(&mut self, matched: usize, expected: usize, issues: I)
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.issues.len();
        self.issues.extend(issues);
        if self.issues.len() > before {
            self.status = Status::Fail;
            self.score = self.score.min(completion_ratio(matched, expected));
        }
    }

    /// Record a hard failure with an explicit score cap
    pub fn fail_with(&mut self, score: u8, issue: impl Into<String>) {
        self.status = Status::Fail;
        self.score = self.score.min(score.min(100));
        self.issues.push(issue.into());
    }

    /// Record an advisory violation
    pub fn soft(&mut self, violation: SoftViolation, issue: impl Into<String>) {
        if self.status != Status::Fail {
            self.status = Status::Warn;
        }
        self.score = self.score.min(violation.ceiling());
        self.issues.push(issue.into());
    }

    /// Flag the dimension as a warning without lowering its score
    pub fn warn(&mut self, issue: impl Into<String>) {
        if self.status == Status::Pass {
            self.status = Status::Warn;
        }
        self.issues.push(issue.into());
    }

    pub fn note(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn metric(&mut self, key: impl Into<String>, value: impl ToString) {
        self.metrics.insert(key.into(), value.to_string());
    }

    pub fn is_fail(&self) -> bool {
        self.status == Status::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_caps_at_ratio() {
        let mut score = DimensionScore::pass();
        score.fail_missing(2, 3, vec!["missing route".to_string()]);
        assert_eq!(score.status, Status::Fail);
        assert_eq!(score.score, 67);
    }

    #[test]
    fn test_no_missing_items_keeps_pass() {
        let mut score = DimensionScore::pass();
        score.fail_missing(3, 3, Vec::new());
        assert_eq!(score, DimensionScore::pass());
    }

    #[test]
    fn test_soft_never_lifts_fail() {
        let mut score = DimensionScore::pass();
        score.fail_missing(0, 2, vec!["nothing matched".to_string()]);
        score.soft(SoftViolation::Minor, "long line");
        assert_eq!(score.status, Status::Fail);
        assert_eq!(score.score, 0);
    }

    #[test]
    fn test_soft_takes_lowest_ceiling() {
        let mut score = DimensionScore::pass();
        score.soft(SoftViolation::Notable, "console.log");
        score.soft(SoftViolation::Minor, "long line");
        assert_eq!(score.status, Status::Warn);
        assert_eq!(score.score, 80);
        assert_eq!(score.issues.len(), 2);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Warn).unwrap(), "\"WARN\"");
        assert_eq!(
            serde_json::to_string(&Dimension::TypesValidation).unwrap(),
            "\"types_validation\""
        );
    }
}
