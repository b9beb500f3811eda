//! Validation environment: every collaborator a pipeline run needs.
//!
//! Stages never construct their own file system, type checker or reporter.
//! They receive a [`ValidationEnv`] and ask it, so the same pipeline runs
//! against the real project or against [`crate::testkit::TestEnv`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::FluxcheckConfig;
use crate::io::{FileSystem, RealFileSystem};
use crate::observability::{Reporter, TracingReporter};
use crate::spec::{FsSpecSource, ProjectLayout, SpecSource};
use crate::typecheck::{ProcessTypeChecker, TypeChecker};

/// Capabilities available to pipeline stages.
pub trait ValidationEnv: Send + Sync {
    fn file_system(&self) -> &dyn FileSystem;

    fn type_checker(&self) -> &dyn TypeChecker;

    fn reporter(&self) -> &dyn Reporter;

    fn config(&self) -> &FluxcheckConfig;

    fn layout(&self) -> &ProjectLayout;

    /// Specification documents, read through this environment's file system
    fn spec_source(&self) -> FsSpecSource<'_> {
        FsSpecSource::new(self.file_system(), self.layout())
    }
}

/// Production environment rooted at a project directory.
#[derive(Clone)]
pub struct RealEnv {
    file_system: Arc<dyn FileSystem>,
    type_checker: Arc<dyn TypeChecker>,
    reporter: Arc<dyn Reporter>,
    config: FluxcheckConfig,
    layout: ProjectLayout,
}

impl RealEnv {
    pub fn new(root: impl Into<PathBuf>, config: FluxcheckConfig) -> Self {
        let root = root.into();
        Self {
            file_system: Arc::new(RealFileSystem::new()),
            type_checker: Arc::new(ProcessTypeChecker::new(&root, &config.typecheck)),
            reporter: Arc::new(TracingReporter),
            layout: ProjectLayout::new(root, &config),
            config,
        }
    }
}

impl ValidationEnv for RealEnv {
    fn file_system(&self) -> &dyn FileSystem {
        self.file_system.as_ref()
    }

    fn type_checker(&self) -> &dyn TypeChecker {
        self.type_checker.as_ref()
    }

    fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    fn config(&self) -> &FluxcheckConfig {
        &self.config
    }

    fn layout(&self) -> &ProjectLayout {
        &self.layout
    }
}
