use chrono::Utc;

use super::validate_scope;
use crate::errors::Result;
use crate::manifest::{EndpointManifest, FeatureReport, ManifestStore};
use crate::pipeline::scope::ValidationScope;
use crate::pipeline::stage::{StageContext, StageOutcome, ValidationStage};

/// Full endpoint validation, manifests and feature reports.
///
/// Endpoint-scoped runs never produce a feature report. File-scoped runs
/// score only the dimensions relevant to the file and write nothing, since a
/// partial record would supersede the endpoint's full manifest.
pub struct ComplianceStage;

impl ValidationStage for ComplianceStage {
    fn name(&self) -> &'static str {
        "compliance"
    }

    fn description(&self) -> &'static str {
        "Score every dimension and write manifests and feature reports"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let env = ctx.env;
        let reporter = env.reporter();
        let store = ManifestStore::new(env.file_system(), env.layout());
        let dimensions = ctx.scope.dimensions();
        let persist = !matches!(ctx.scope.scope, ValidationScope::File { .. });
        let now = Utc::now();

        let features = validate_scope(env, ctx.scope, &dimensions, ctx.type_check.as_ref());

        let mut failures = Vec::new();
        let mut reliable = 0;
        for feature in &features {
            for validated in &feature.endpoints {
                let record = &validated.record;
                if record.overall_reliable {
                    reliable += 1;
                    reporter.check_pass(
                        &record.key(),
                        &format!("reliability {}% ({})", record.reliability_score, record.scoring_mode),
                    );
                } else {
                    let first = record
                        .blocking_issues
                        .first()
                        .cloned()
                        .unwrap_or_else(|| format!("reliability {}%", record.reliability_score));
                    reporter.check_fail(&record.key(), &first);
                    failures.push(format!("{}: {}", record.key(), first));
                }
                if persist {
                    let path = store.write_endpoint(&EndpointManifest::from_record(record, now))?;
                    ctx.written.push(path);
                }
            }

            if ctx.scope.scope.covers_whole_features() {
                let records: Vec<_> = feature.endpoints.iter().map(|v| v.record.clone()).collect();
                let logic: Vec<(String, String)> = feature
                    .endpoints
                    .iter()
                    .filter_map(|v| {
                        v.logic_source
                            .as_ref()
                            .map(|text| (v.record.endpoint.clone(), text.clone()))
                    })
                    .collect();
                let report = FeatureReport::build(
                    &feature.scope.name,
                    &records,
                    &logic,
                    &feature.scope.spec.validation_targets,
                    &env.config().duplication,
                    now,
                );

                let breaking = &report.breaking_change_analysis;
                for collision in &breaking.route_collisions {
                    let claimants: Vec<&str> = collision.claimants.keys().map(String::as_str).collect();
                    let message = format!(
                        "route '{}' claimed by {}",
                        collision.route,
                        claimants.join(", ")
                    );
                    reporter.error(&format!("{}: {}", feature.scope.name, message));
                    if breaking.blocks() {
                        failures.push(format!("{}: {}", feature.scope.name, message));
                    }
                }
                for overlap in &breaking.parameter_overlaps {
                    reporter.warn(&format!(
                        "{}: routes '{}' and '{}' overlap",
                        feature.scope.name, overlap.routes[0], overlap.routes[1]
                    ));
                }
                let duplication = &report.duplication_analysis;
                for shared in duplication.shared_code.iter().filter(|s| s.is_problematic()) {
                    let [a, b] = shared.endpoints();
                    reporter.warn(&format!(
                        "{}: {} and {} share code, independence {}%",
                        feature.scope.name, a, b, duplication.independence_score
                    ));
                }

                ctx.written.push(store.write_feature(&report)?);
            } else {
                reporter.info(&format!(
                    "Feature report skipped for {}: scope does not cover the whole feature",
                    ctx.scope.scope
                ));
            }

            ctx.records.extend(feature.endpoints.iter().map(|v| v.record.clone()));
        }

        let total = ctx.records.len();
        if failures.is_empty() {
            Ok(StageOutcome::pass(format!(
                "{}/{} endpoint(s) deployment ready",
                reliable, total
            )))
        } else {
            Ok(StageOutcome::fail(
                format!("{}/{} endpoint(s) deployment ready", reliable, total),
                failures,
            ))
        }
    }
}
