//! Dimension scoring and reliability aggregation.
//!
//! Each dimension starts at a ceiling of 100. Missing required items force
//! `FAIL` and cap the score at a completion ratio; advisory violations force
//! `WARN` and cap it at a severity ceiling. Dimension scores roll up into an
//! endpoint reliability score under a [`ScoringPolicy`].

pub mod dimension;
pub mod guard;
pub mod penalty;
pub mod policy;

pub use dimension::{Dimension, DimensionScore, Status};
pub use guard::guarded;
pub use penalty::{completion_ratio, SoftViolation};
pub use policy::{ScoringPolicy, ScoringWeights, DEFAULT_MINIMUM};
