use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::breaking::{analyze_breaking_changes, BreakingChangeAnalysis};
use super::duplication::{analyze_duplication, DuplicationAnalysis};
use crate::config::DuplicationConfig;
use crate::endpoint::EndpointRecord;
use crate::scoring::Status;
use crate::spec::ValidationTargets;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_endpoints: usize,
    pub compliant_endpoints: usize,
    pub compliance_rate: u8,
    pub average_reliability: u8,
}

impl ComplianceSummary {
    pub fn from_records(records: &[EndpointRecord]) -> Self {
        let total = records.len();
        let compliant = records.iter().filter(|r| r.overall_reliable).count();
        let sum: usize = records.iter().map(|r| usize::from(r.reliability_score)).sum();
        Self {
            total_endpoints: total,
            compliant_endpoints: compliant,
            compliance_rate: rounded_percent(compliant, total),
            average_reliability: if total == 0 {
                0
            } else {
                (sum as f64 / total as f64).round() as u8
            },
        }
    }
}

fn rounded_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round().min(100.0) as u8
}

/// Per-endpoint line of the feature report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSummary {
    pub endpoint: String,
    pub route: Option<String>,
    pub reliability_score: u8,
    pub overall_reliable: bool,
    pub blocking_issues: usize,
}

impl From<&EndpointRecord> for EndpointSummary {
    fn from(record: &EndpointRecord) -> Self {
        Self {
            endpoint: record.endpoint.clone(),
            route: record.route.clone(),
            reliability_score: record.reliability_score,
            overall_reliable: record.overall_reliable,
            blocking_issues: record.blocking_issues.len(),
        }
    }
}

/// Feature-wide aggregation, regenerated wholesale on every feature or full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub feature: String,
    pub status: Status,
    pub generated_at: DateTime<Utc>,
    pub compliance_summary: ComplianceSummary,
    pub breaking_change_analysis: BreakingChangeAnalysis,
    pub duplication_analysis: DuplicationAnalysis,
    pub endpoints: Vec<EndpointSummary>,
}

impl FeatureReport {
    /// Build the report from every validated endpoint of one feature.
    ///
    /// `logic_sources` pairs endpoint names with logic text for the
    /// endpoints whose logic file could be read.
    pub fn build(
        feature: &str,
        records: &[EndpointRecord],
        logic_sources: &[(String, String)],
        targets: &ValidationTargets,
        duplication: &DuplicationConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let summary = ComplianceSummary::from_records(records);
        let claims: BTreeMap<String, BTreeMap<String, String>> = records
            .iter()
            .map(|r| (r.endpoint.clone(), r.routes.clone()))
            .collect();
        let breaking = analyze_breaking_changes(&claims, targets.route_conflicts_blocked());
        let duplication = analyze_duplication(logic_sources, duplication);

        let status = if breaking.has_collisions() || summary.compliant_endpoints < summary.total_endpoints {
            Status::Fail
        } else if duplication.problematic_pairs > 0 || !breaking.parameter_overlaps.is_empty() {
            Status::Warn
        } else {
            Status::Pass
        };

        Self {
            feature: feature.to_string(),
            status,
            generated_at,
            compliance_summary: summary,
            breaking_change_analysis: breaking,
            duplication_analysis: duplication,
            endpoints: records.iter().map(EndpointSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ValidationPhase;
    use pretty_assertions::assert_eq;

    fn record(endpoint: &str, score: u8, reliable: bool, route: &str) -> EndpointRecord {
        EndpointRecord {
            feature: "users".to_string(),
            endpoint: endpoint.to_string(),
            route: Some(route.to_string()),
            scoring_mode: "strict_all_pass".to_string(),
            phase: ValidationPhase::Aggregated,
            routes: [(route.to_string(), format!("{}Handler", endpoint))].into_iter().collect(),
            dimensions: BTreeMap::new(),
            reliability_score: score,
            overall_reliable: reliable,
            blocking_issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn build(records: &[EndpointRecord]) -> FeatureReport {
        FeatureReport::build(
            "users",
            records,
            &[],
            &ValidationTargets::default(),
            &DuplicationConfig::default(),
            Utc::now(),
        )
    }

    #[test]
    fn test_compliance_summary_rounds() {
        let report = build(&[
            record("a", 100, true, "GET /a"),
            record("b", 95, true, "GET /b"),
            record("c", 60, false, "GET /c"),
        ]);
        assert_eq!(
            report.compliance_summary,
            ComplianceSummary {
                total_endpoints: 3,
                compliant_endpoints: 2,
                compliance_rate: 67,
                average_reliability: 85,
            }
        );
        assert_eq!(report.status, Status::Fail);
    }

    #[test]
    fn test_collision_fails_feature() {
        let report = build(&[
            record("get", 100, true, "GET /users/:id"),
            record("profile", 100, true, "GET /users/:id"),
        ]);
        assert_eq!(report.breaking_change_analysis.route_collisions.len(), 1);
        assert_eq!(report.status, Status::Fail);
    }

    #[test]
    fn test_clean_feature_passes() {
        let report = build(&[
            record("get", 100, true, "GET /users/:id"),
            record("list", 98, true, "GET /users"),
        ]);
        assert_eq!(report.status, Status::Pass);
        assert_eq!(report.compliance_summary.compliance_rate, 100);
        assert_eq!(report.endpoints.len(), 2);
    }
}
