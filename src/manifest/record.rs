use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::endpoint::EndpointRecord;
use crate::scoring::{DimensionScore, Status};

/// Persisted form of one endpoint's validation record.
///
/// Superseded, never merged, by the next run over the same endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointManifest {
    pub endpoint: String,
    pub feature: String,
    pub route: Option<String>,
    pub status: Status,
    pub generated_at: DateTime<Utc>,
    pub scoring_mode: String,
    pub routes: BTreeMap<String, String>,
    pub reliability_validation: BTreeMap<String, DimensionEntry>,
    pub overall_reliability: u8,
    pub deployment_ready: bool,
    pub blocking_issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One dimension as written to the manifest, metrics inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionEntry {
    pub status: Status,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, String>,
}

impl From<&DimensionScore> for DimensionEntry {
    fn from(score: &DimensionScore) -> Self {
        Self {
            status: score.status,
            score: score.score,
            issues: score.issues.clone(),
            warnings: score.warnings.clone(),
            metrics: score.metrics.clone(),
        }
    }
}

impl EndpointManifest {
    pub fn from_record(record: &EndpointRecord, generated_at: DateTime<Utc>) -> Self {
        Self {
            endpoint: record.endpoint.clone(),
            feature: record.feature.clone(),
            route: record.route.clone(),
            status: if record.overall_reliable {
                Status::Pass
            } else {
                Status::Fail
            },
            generated_at,
            scoring_mode: record.scoring_mode.clone(),
            routes: record.routes.clone(),
            reliability_validation: record
                .dimensions
                .iter()
                .map(|(d, s)| (d.as_str().to_string(), DimensionEntry::from(s)))
                .collect(),
            overall_reliability: record.reliability_score,
            deployment_ready: record.overall_reliable,
            blocking_issues: record.blocking_issues.clone(),
            warnings: record.warnings.clone(),
        }
    }

    /// `feature/endpoint`
    pub fn key(&self) -> String {
        format!("{}/{}", self.feature, self.endpoint)
    }
}
