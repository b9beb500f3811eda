//! The standard validation stages.

pub mod compliance;
pub mod dimension;
pub mod typecheck;

pub use compliance::ComplianceStage;
pub use dimension::DimensionStage;
pub use typecheck::TypeCheckStage;

use rayon::prelude::*;

use super::scope::{FeatureScope, ResolvedScope, ValidationScope};
use crate::endpoint::{EndpointTarget, EndpointValidator, ValidatedEndpoint};
use crate::env::ValidationEnv;
use crate::scoring::Dimension;
use crate::typecheck::TypeCheckOutcome;

/// Validated endpoints of one in-scope feature, in endpoint order.
pub(crate) struct ValidatedFeature<'s> {
    pub scope: &'s FeatureScope,
    pub endpoints: Vec<ValidatedEndpoint>,
}

/// Validate every in-scope endpoint for the given dimensions.
///
/// Endpoints are independent, so they run on the rayon pool when the
/// configuration allows it. Results keep the scope's ordering.
pub(crate) fn validate_scope<'s>(
    env: &dyn ValidationEnv,
    scope: &'s ResolvedScope,
    dimensions: &[Dimension],
    type_check: Option<&TypeCheckOutcome>,
) -> Vec<ValidatedFeature<'s>> {
    let validator = EndpointValidator::new(env.file_system(), env.layout()).with_type_check(type_check);

    scope
        .features
        .iter()
        .map(|feature| {
            let targets: Vec<EndpointTarget<'_>> = feature
                .endpoint_specs()
                .map(|(endpoint, spec)| EndpointTarget {
                    feature: &feature.name,
                    endpoint,
                    spec,
                    targets: &feature.spec.validation_targets,
                })
                .collect();

            let endpoints = if env.config().parallel {
                targets
                    .par_iter()
                    .map(|target| validator.validate(target, dimensions))
                    .collect()
            } else {
                targets
                    .iter()
                    .map(|target| validator.validate(target, dimensions))
                    .collect()
            };

            ValidatedFeature {
                scope: feature,
                endpoints,
            }
        })
        .collect()
}

/// Project-relative paths of every existing in-scope artifact
pub(crate) fn scope_files(env: &dyn ValidationEnv, scope: &ResolvedScope) -> Vec<String> {
    let layout = env.layout();
    let fs = env.file_system();
    let mut files = Vec::new();

    for feature in &scope.features {
        for (endpoint, spec) in feature.endpoint_specs() {
            let paths = layout.artifacts(&feature.name, endpoint, spec);
            let candidates = match &scope.scope {
                ValidationScope::File { file, .. } => vec![paths.endpoint_dir.join(file)],
                _ => vec![paths.contract, paths.logic, paths.test],
            };
            files.extend(
                candidates
                    .into_iter()
                    .filter(|p| fs.is_file(p))
                    .map(|p| layout.relative(&p)),
            );
        }
    }
    files
}
