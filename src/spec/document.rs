use crate::errors::{Error, Result};
use crate::scoring::ScoringWeights;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::notes::strip_notes;

/// One feature's specification document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    #[serde(default)]
    pub endpoints: BTreeMap<String, EndpointSpec>,

    #[serde(default)]
    pub validation_targets: ValidationTargets,
}

impl FeatureSpec {
    /// Parse a specification document, dropping documentation-only keys first.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(text)?;
        strip_notes(&mut value);
        serde_json::from_value(value)
            .map_err(|e| Error::Specification(format!("invalid specification document: {}", e)))
    }

    /// Look up an endpoint by name.
    pub fn endpoint(&self, feature: &str, name: &str) -> Result<&EndpointSpec> {
        self.endpoints
            .get(name)
            .ok_or_else(|| Error::UnknownEndpoint {
                feature: feature.to_string(),
                endpoint: name.to_string(),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Primary route, informational when `contract.routes` is present
    #[serde(default)]
    pub route: Option<String>,

    /// Directory under the feature holding the artifacts; defaults to the endpoint name
    #[serde(default)]
    pub folder: Option<String>,

    #[serde(default)]
    pub contract: ContractSpec,

    #[serde(default)]
    pub logic: LogicSpec,

    #[serde(default)]
    pub test: Option<TestSpec>,

    #[serde(default)]
    pub validation_specifics: ValidationSpecifics,
}

impl EndpointSpec {
    /// Test-case names the specification requires, in declaration order
    pub fn declared_tests(&self) -> Vec<String> {
        self.test
            .as_ref()
            .map(|t| t.test_cases.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Exported symbols required by either the contract or the logic entry
    pub fn required_exports(&self) -> Vec<String> {
        let mut exports = self.logic.exports.clone();
        for name in &self.contract.exports {
            if !exports.contains(name) {
                exports.push(name.clone());
            }
        }
        exports
    }

    /// Endpoints only get sanitization checks when they declare a security requirement
    pub fn is_security_sensitive(&self) -> bool {
        match &self.validation_specifics.security_requirements {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(text)) => !text.trim().is_empty(),
            Some(Value::Number(_)) => true,
        }
    }

    pub fn coverage_target(&self) -> Option<u32> {
        self.test.as_ref().and_then(|t| t.coverage_target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    #[serde(default)]
    pub file: Option<String>,

    /// Route string to handler name
    #[serde(default)]
    pub routes: BTreeMap<String, String>,

    #[serde(default)]
    pub imports: ImportSpec,

    #[serde(default)]
    pub exports: Vec<String>,

    #[serde(default)]
    pub helpers: Vec<String>,

    #[serde(default)]
    pub publishes: Vec<String>,

    #[serde(default)]
    pub subscribes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSpec {
    #[serde(default)]
    pub framework: Vec<String>,

    #[serde(default)]
    pub external: Vec<String>,
}

impl ImportSpec {
    pub fn all(&self) -> Vec<String> {
        self.framework
            .iter()
            .chain(self.external.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicSpec {
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub exports: Vec<String>,

    #[serde(default)]
    pub imports: ImportSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub test_cases: Vec<TestCaseSpec>,

    #[serde(default)]
    pub coverage_target: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCaseSpec {
    pub name: String,

    /// Free-form metadata (expected status, fixtures, ...)
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSpecifics {
    #[serde(default)]
    pub required_test_patterns: Vec<String>,

    #[serde(default)]
    pub security_requirements: Option<Value>,

    #[serde(default, alias = "required_voilajsx_patterns")]
    pub required_patterns: Vec<String>,
}

/// Thresholds and weights configured per feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationTargets {
    #[serde(default)]
    pub reliability_thresholds: Option<ReliabilityThresholds>,

    #[serde(default)]
    pub scoring_weights: Option<ScoringWeights>,

    #[serde(default)]
    pub required_coverage: Option<u32>,

    #[serde(default, alias = "voilajsx_patterns")]
    pub framework_patterns: Option<FrameworkPatterns>,

    #[serde(default)]
    pub breaking_change_prevention: Option<BreakingChangePrevention>,
}

impl ValidationTargets {
    /// Whether route collisions block the feature report
    pub fn route_conflicts_blocked(&self) -> bool {
        self.breaking_change_prevention
            .as_ref()
            .map(|b| b.route_conflicts_blocked)
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityThresholds {
    #[serde(default)]
    pub overall_reliability_minimum: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworkPatterns {
    #[serde(default)]
    pub required_patterns: Vec<String>,

    #[serde(default)]
    pub security_patterns: Vec<String>,

    #[serde(default)]
    pub response_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakingChangePrevention {
    #[serde(default = "default_true")]
    pub route_conflicts_blocked: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const DOC: &str = indoc! {r#"
        {
          "notes": "users feature",
          "endpoints": {
            "get": {
              "route": "GET /users/:id",
              "contract": {
                "file": "get.contract.ts",
                "routes": { "GET /users/:id": "getUser" },
                "imports": { "framework": ["auth"], "external": [] },
                "routes_notes": "one route only"
              },
              "logic": { "file": "get.logic.ts", "exports": ["getUser"] },
              "test": {
                "file": "get.test.ts",
                "test_cases": [{ "name": "returns user", "status": 200 }],
                "coverage_target": 80
              },
              "validation_specifics": {
                "security_requirements": ["input sanitization"],
                "required_voilajsx_patterns": ["authClass.get()"]
              }
            }
          },
          "validation_targets": {
            "reliability_thresholds": { "overall_reliability_minimum": 85 },
            "voilajsx_patterns": { "required_patterns": ["logger.info"] }
          }
        }
    "#};

    #[test]
    fn test_parse_document() {
        let spec = FeatureSpec::from_json_str(DOC).unwrap();
        let get = spec.endpoint("users", "get").unwrap();

        assert_eq!(get.contract.routes["GET /users/:id"], "getUser");
        assert_eq!(get.declared_tests(), vec!["returns user"]);
        assert_eq!(get.coverage_target(), Some(80));
        assert!(get.is_security_sensitive());
        assert_eq!(get.validation_specifics.required_patterns, vec!["authClass.get()"]);
        assert_eq!(
            get.test.as_ref().unwrap().test_cases[0].metadata["status"],
            serde_json::json!(200)
        );
        assert_eq!(
            spec.validation_targets
                .framework_patterns
                .as_ref()
                .unwrap()
                .required_patterns,
            vec!["logger.info"]
        );
        assert!(spec.validation_targets.route_conflicts_blocked());
    }

    #[test]
    fn test_unknown_endpoint() {
        let spec = FeatureSpec::from_json_str(DOC).unwrap();
        let err = spec.endpoint("users", "delete").unwrap_err();
        assert!(matches!(err, Error::UnknownEndpoint { .. }));
    }

    #[test]
    fn test_security_sensitivity() {
        let mut endpoint = EndpointSpec::default();
        assert!(!endpoint.is_security_sensitive());

        endpoint.validation_specifics.security_requirements = Some(serde_json::json!([]));
        assert!(!endpoint.is_security_sensitive());

        endpoint.validation_specifics.security_requirements =
            Some(serde_json::json!({ "sanitize": ["email"] }));
        assert!(endpoint.is_security_sensitive());
    }

    #[test]
    fn test_invalid_shape_is_specification_error() {
        let err = FeatureSpec::from_json_str(r#"{ "endpoints": [] }"#).unwrap_err();
        assert!(matches!(err, Error::Specification(_)));
    }
}
