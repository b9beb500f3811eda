//! Validation of a single endpoint.
//!
//! An endpoint is a contract, a logic file, a test file and any helpers the
//! contract declares. Validation moves through a fixed sequence of phases:
//!
//! ```text
//! NotStarted -> FilesChecked -> FactsExtracted -> Reconciled -> Scored -> Aggregated
//! ```
//!
//! A missing or unreadable contract or logic file jumps straight to
//! `Aggregated` with a failing record and no dimension scores.

pub mod contract_check;
pub mod lint_check;
pub mod quality_check;
pub mod test_check;
pub mod types_check;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::errors::Error;
use crate::extract::{
    extract_contract, extract_logic, extract_tests, ContractExtraction, FactSet, Section,
};
use crate::io::FileSystem;
use crate::reconcile::{
    reconcile, reconcile_imports, reconcile_routes, reconcile_tests, Reconciliation, RouteBinding,
};
use crate::scoring::{guarded, Dimension, DimensionScore, ScoringPolicy};
use crate::spec::{ArtifactPaths, EndpointSpec, ProjectLayout, ValidationTargets};
use crate::typecheck::TypeCheckOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPhase {
    NotStarted,
    FilesChecked,
    FactsExtracted,
    Reconciled,
    Scored,
    Aggregated,
}

/// One endpoint of one feature, with its specification entry.
#[derive(Debug, Clone, Copy)]
pub struct EndpointTarget<'a> {
    pub feature: &'a str,
    pub endpoint: &'a str,
    pub spec: &'a EndpointSpec,
    pub targets: &'a ValidationTargets,
}

/// The validation record of one endpoint, persisted as its manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointRecord {
    pub feature: String,
    pub endpoint: String,
    pub route: Option<String>,
    pub scoring_mode: String,
    pub phase: ValidationPhase,
    /// Routes this endpoint claims, with their handlers
    pub routes: BTreeMap<String, String>,
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    pub reliability_score: u8,
    pub overall_reliable: bool,
    pub blocking_issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl EndpointRecord {
    fn new(target: &EndpointTarget<'_>, policy: &ScoringPolicy) -> Self {
        Self {
            feature: target.feature.to_string(),
            endpoint: target.endpoint.to_string(),
            route: target.spec.route.clone(),
            scoring_mode: policy.mode_name().to_string(),
            phase: ValidationPhase::NotStarted,
            routes: target.spec.contract.routes.clone(),
            dimensions: BTreeMap::new(),
            reliability_score: 0,
            overall_reliable: false,
            blocking_issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// `feature/endpoint`
    pub fn key(&self) -> String {
        format!("{}/{}", self.feature, self.endpoint)
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.get(&dimension)
    }

    fn advance(&mut self, phase: ValidationPhase) {
        debug_assert!(phase > self.phase);
        self.phase = phase;
    }

    fn short_circuit(mut self, problems: Vec<String>) -> Self {
        self.reliability_score = 0;
        self.overall_reliable = false;
        self.blocking_issues = problems;
        self.phase = ValidationPhase::Aggregated;
        self
    }

    fn aggregate(&mut self, policy: &ScoringPolicy, dimensions: BTreeMap<Dimension, DimensionScore>) {
        self.reliability_score = policy.reliability_score(&dimensions);
        self.overall_reliable = policy.is_reliable(self.reliability_score, &dimensions);
        self.blocking_issues = policy.blocking_issues(&dimensions);
        self.warnings.extend(
            dimensions
                .iter()
                .flat_map(|(d, s)| s.warnings.iter().map(move |w| format!("{}: {}", d.label(), w))),
        );
        self.dimensions = dimensions;
        self.advance(ValidationPhase::Aggregated);
    }
}

/// Raw artifact text of one endpoint.
#[derive(Debug, Clone, Default)]
pub struct EndpointSources {
    pub contract: String,
    pub logic: String,
    /// `None` when the test file does not exist
    pub test: Option<String>,
    /// Declared helper names whose files exist
    pub helpers_present: BTreeSet<String>,
    /// Project-relative paths of every artifact, for diagnostic attribution
    pub files: Vec<String>,
    pub test_path: String,
}

impl EndpointSources {
    pub fn test_text(&self) -> &str {
        self.test.as_deref().unwrap_or("")
    }
}

/// Facts extracted from each artifact.
#[derive(Debug, Clone, Default)]
pub struct EndpointFacts {
    pub contract: ContractExtraction,
    pub logic: FactSet,
    pub tests: FactSet,
}

impl EndpointFacts {
    pub fn extract(sources: &EndpointSources) -> Self {
        Self {
            contract: extract_contract(&sources.contract),
            logic: extract_logic(&sources.logic),
            tests: extract_tests(sources.test_text()),
        }
    }
}

/// Both reconciliation passes for one endpoint.
///
/// The first pass holds the contract to the specification. The second holds
/// the implementation to the contract.
#[derive(Debug, Clone, Default)]
pub struct EndpointReconciliation {
    pub spec_routes: Reconciliation<RouteBinding>,
    pub spec_imports: Reconciliation<String>,
    pub spec_exports: Reconciliation<String>,
    pub handlers: Reconciliation<String>,
    pub imports: Reconciliation<String>,
    pub helpers: Reconciliation<String>,
    pub publishes: Reconciliation<String>,
    pub subscribes: Reconciliation<String>,
    pub tests: Reconciliation<String>,
    /// Where the declared test list came from
    pub tests_declared_by: &'static str,
}

impl EndpointReconciliation {
    pub fn compute(spec: &EndpointSpec, sources: &EndpointSources, facts: &EndpointFacts) -> Self {
        let contract = &facts.contract.facts;
        let exports: Vec<String> = facts.logic.exports.iter().cloned().collect();
        let required_exports = spec.required_exports();

        let mut handlers = reconcile(&contract.handlers(), &exports);
        handlers.extra.retain(|e| !required_exports.contains(e));

        let (declared_tests, tests_declared_by) = if facts.contract.declares(Section::Tests) {
            (contract.tests.clone(), "contract")
        } else {
            (spec.declared_tests(), "specification")
        };

        let present: Vec<String> = sources.helpers_present.iter().cloned().collect();
        let as_vec = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>();

        Self {
            spec_routes: reconcile_routes(&spec.contract.routes, &contract.routes),
            spec_imports: reconcile(&spec.contract.imports.all(), &contract.imports.all()),
            spec_exports: reconcile(&required_exports, &exports),
            handlers,
            imports: reconcile_imports(&contract.imports.all(), &facts.logic.imports.all()),
            helpers: reconcile(&contract.helpers, &present),
            publishes: reconcile(&as_vec(&contract.publishes), &as_vec(&facts.logic.publishes)),
            subscribes: reconcile(&as_vec(&contract.subscribes), &as_vec(&facts.logic.subscribes)),
            tests: reconcile_tests(&declared_tests, &facts.tests.tests),
            tests_declared_by,
        }
    }
}

/// Everything a dimension check may look at.
#[derive(Clone, Copy)]
pub struct EndpointView<'a> {
    pub spec: &'a EndpointSpec,
    pub targets: &'a ValidationTargets,
    pub sources: &'a EndpointSources,
    pub facts: &'a EndpointFacts,
    pub reconciled: &'a EndpointReconciliation,
    pub type_check: Option<&'a TypeCheckOutcome>,
}

/// Output of validating one endpoint.
#[derive(Debug, Clone)]
pub struct ValidatedEndpoint {
    pub record: EndpointRecord,
    /// Logic text, kept for feature-level duplication analysis
    pub logic_source: Option<String>,
}

/// Runs the phases of endpoint validation against a file system.
pub struct EndpointValidator<'a> {
    fs: &'a dyn FileSystem,
    layout: &'a ProjectLayout,
    type_check: Option<&'a TypeCheckOutcome>,
}

impl<'a> EndpointValidator<'a> {
    pub fn new(fs: &'a dyn FileSystem, layout: &'a ProjectLayout) -> Self {
        Self {
            fs,
            layout,
            type_check: None,
        }
    }

    /// Attach the outcome of the type-check stage
    pub fn with_type_check(mut self, outcome: Option<&'a TypeCheckOutcome>) -> Self {
        self.type_check = outcome;
        self
    }

    /// Validate one endpoint, computing only the requested dimensions.
    pub fn validate(&self, target: &EndpointTarget<'_>, dimensions: &[Dimension]) -> ValidatedEndpoint {
        let policy = ScoringPolicy::from_targets(target.targets);
        let mut record = EndpointRecord::new(target, &policy);
        let paths = self.layout.artifacts(target.feature, target.endpoint, target.spec);

        let mut sources = match self.load_required(&paths) {
            Ok(sources) => sources,
            Err(problems) => {
                tracing::warn!(
                    feature = target.feature,
                    endpoint = target.endpoint,
                    "Required artifact missing; skipping dimension checks"
                );
                return ValidatedEndpoint {
                    record: record.short_circuit(problems),
                    logic_source: None,
                };
            }
        };
        record.advance(ValidationPhase::FilesChecked);

        let facts = EndpointFacts::extract(&sources);
        self.locate_helpers(&paths, &facts, &mut sources);
        if facts.contract.declares(Section::Routes) {
            record.routes = facts.contract.facts.routes.clone();
        }
        for section in [Section::Routes, Section::Imports] {
            if !facts.contract.declares(section) {
                record.warnings.push(format!("contract has no {} section", section));
            }
        }
        record.advance(ValidationPhase::FactsExtracted);

        let reconciled = EndpointReconciliation::compute(target.spec, &sources, &facts);
        record.advance(ValidationPhase::Reconciled);

        let view = EndpointView {
            spec: target.spec,
            targets: target.targets,
            sources: &sources,
            facts: &facts,
            reconciled: &reconciled,
            type_check: self.type_check,
        };
        let scores = match self.type_check.filter(|o| o.is_fatal()) {
            Some(outcome) => failed_all(dimensions, outcome),
            None => dimensions
                .iter()
                .map(|&d| (d, guarded(d, || score_dimension(d, &view))))
                .collect(),
        };
        record.advance(ValidationPhase::Scored);

        record.aggregate(&policy, scores);
        tracing::debug!(
            feature = target.feature,
            endpoint = target.endpoint,
            score = record.reliability_score,
            reliable = record.overall_reliable,
            "Endpoint validated"
        );

        ValidatedEndpoint {
            record,
            logic_source: Some(sources.logic),
        }
    }

    fn load_required(&self, paths: &ArtifactPaths) -> Result<EndpointSources, Vec<String>> {
        let contract = self.read_required(&paths.contract, "contract");
        let logic = self.read_required(&paths.logic, "logic");

        let (contract, logic) = match (contract, logic) {
            (Ok(contract), Ok(logic)) => (contract, logic),
            (contract, logic) => {
                return Err([contract.err(), logic.err()].into_iter().flatten().collect());
            }
        };

        let test = match self.fs.read_to_string(&paths.test) {
            Ok(text) => Some(text),
            Err(e) if e.is_file_not_found() => None,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable test file treated as missing");
                None
            }
        };

        Ok(EndpointSources {
            contract,
            logic,
            test,
            helpers_present: BTreeSet::new(),
            files: [&paths.contract, &paths.logic, &paths.test]
                .iter()
                .map(|p| self.layout.relative(p))
                .collect(),
            test_path: self.layout.relative(&paths.test),
        })
    }

    fn read_required(&self, path: &Path, kind: &str) -> Result<String, String> {
        self.fs.read_to_string(path).map_err(|e| match e {
            Error::FileNotFound { .. } => {
                format!("missing {} file: {}", kind, self.layout.relative(path))
            }
            other => format!("unreadable {} file: {}", kind, other),
        })
    }

    fn locate_helpers(&self, paths: &ArtifactPaths, facts: &EndpointFacts, sources: &mut EndpointSources) {
        for helper in &facts.contract.facts.helpers {
            let path = paths.helper(helper);
            if self.fs.is_file(&path) {
                sources.helpers_present.insert(helper.clone());
                sources.files.push(self.layout.relative(&path));
            }
        }
    }
}

fn score_dimension(dimension: Dimension, view: &EndpointView<'_>) -> crate::errors::Result<DimensionScore> {
    match dimension {
        Dimension::ContractCompliance => contract_check::check_contract(view),
        Dimension::TestValidation => test_check::check_tests(view),
        Dimension::TypesValidation => types_check::check_types(view),
        Dimension::LintValidation => lint_check::check_lint(view),
        Dimension::CodeQuality => quality_check::check_quality(view),
    }
}

/// Every requested dimension fails when the type checker could not produce a verdict
fn failed_all(
    dimensions: &[Dimension],
    outcome: &TypeCheckOutcome,
) -> BTreeMap<Dimension, DimensionScore> {
    let reason = outcome
        .diagnostics
        .first()
        .cloned()
        .unwrap_or_else(|| "type checker failed".to_string());
    dimensions
        .iter()
        .map(|&d| (d, DimensionScore::crashed(reason.clone())))
        .collect()
}
