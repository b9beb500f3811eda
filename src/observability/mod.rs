//! Reporting sink and tracing setup.
//!
//! Library code never reaches for a global logger. The pipeline runner and
//! its stages receive a [`Reporter`] explicitly and emit leveled events
//! through it; [`TracingReporter`] forwards those to `tracing`.

pub mod reporter;
pub mod tracing;

pub use self::reporter::{Reporter, SilentReporter, TracingReporter};
pub use self::tracing::init_tracing;
