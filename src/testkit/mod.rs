//! In-memory collaborators for fast, isolated tests.
//!
//! ```rust,ignore
//! use fluxcheck::testkit::{fixtures, TestEnv};
//!
//! let env = TestEnv::new().with_files(fixtures::users_feature_files());
//! let report = PipelineRunner::new(&env).run("users".parse()?, &stages)?;
//! assert!(report.success());
//! ```

pub mod fixtures;
pub mod memory_fs;
pub mod mock_env;
pub mod recording;

pub use memory_fs::MemoryFileSystem;
pub use mock_env::{MockTypeChecker, TestEnv};
pub use recording::{RecordingReporter, ReportEvent};
