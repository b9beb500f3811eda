// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod endpoint;
pub mod env;
pub mod errors;
pub mod extract;
pub mod io;
pub mod manifest;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod scoring;
pub mod spec;
pub mod testkit;
pub mod typecheck;

// Re-export commonly used types
pub use crate::config::{load_config, FluxcheckConfig};
pub use crate::endpoint::{EndpointRecord, EndpointValidator};
pub use crate::env::{RealEnv, ValidationEnv};
pub use crate::errors::{Error, Result};
pub use crate::manifest::{EndpointManifest, FeatureReport, ManifestStore};
pub use crate::pipeline::{PipelineReport, PipelineRunner, StageRegistry, ValidationScope};
pub use crate::reconcile::{reconcile, Reconciliation};
pub use crate::scoring::{Dimension, DimensionScore, ScoringPolicy, Status};
