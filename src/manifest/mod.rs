//! Aggregation of validation results into persisted artifacts.
//!
//! - `record`: per-endpoint manifest, keyed by `feature/endpoint`
//! - `feature`: feature report with compliance summary
//! - `duplication`: shared code between endpoints of one feature
//! - `breaking`: route collisions and overlapping parameterized paths
//! - `store`: writes both through the [`crate::io::FileSystem`] collaborator
//!
//! Feature reports are only produced for feature or full scope runs.

pub mod breaking;
pub mod duplication;
pub mod feature;
pub mod record;
pub mod store;

pub use breaking::{analyze_breaking_changes, BreakingChangeAnalysis, ParameterOverlap, RouteCollision};
pub use duplication::{analyze_duplication, DuplicationAnalysis, SharedCode};
pub use feature::{ComplianceSummary, EndpointSummary, FeatureReport};
pub use record::{DimensionEntry, EndpointManifest};
pub use store::ManifestStore;
