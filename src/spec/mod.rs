//! Specification documents: the ground truth a feature's contracts must match.

pub mod document;
pub mod layout;
pub mod notes;
pub mod source;

pub use document::{
    BreakingChangePrevention, ContractSpec, EndpointSpec, FeatureSpec, FrameworkPatterns,
    ImportSpec, LogicSpec, ReliabilityThresholds, TestCaseSpec, TestSpec, ValidationSpecifics,
    ValidationTargets,
};
pub use layout::{ArtifactKind, ArtifactPaths, ProjectLayout};
pub use notes::strip_notes;
pub use source::{FsSpecSource, SpecSource};
