//! Fail-fast validation pipeline.
//!
//! ```text
//! target ──parse──> ValidationScope ──resolve──> ResolvedScope
//!                                                     │
//!   typecheck ─> lint ─> contract ─> test ─> compliance   (stop at first failure)
//! ```
//!
//! Stages come from a static [`StageRegistry`]; the ordered list to run is
//! configuration (`stages` in `.fluxcheck.toml`) or the `--stages` flag.

pub mod registry;
pub mod runner;
pub mod scope;
pub mod stage;
pub mod stages;

pub use registry::StageRegistry;
pub use runner::{PipelineReport, PipelineRunner};
pub use scope::{FeatureScope, ResolvedScope, ValidationScope};
pub use stage::{StageContext, StageOutcome, StageResult, StageStatus, ValidationStage};
