use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::FluxcheckConfig;
use crate::env::ValidationEnv;
use crate::errors::{Error, Result};
use crate::io::FileSystem;
use crate::observability::Reporter;
use crate::spec::ProjectLayout;
use crate::typecheck::{TypeCheckOutcome, TypeChecker};

use super::memory_fs::MemoryFileSystem;
use super::recording::RecordingReporter;

/// Type checker returning a canned outcome and remembering what it was asked.
#[derive(Debug, Clone)]
pub struct MockTypeChecker {
    outcome: std::result::Result<TypeCheckOutcome, String>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Default for MockTypeChecker {
    fn default() -> Self {
        Self::returning(TypeCheckOutcome::clean())
    }
}

impl MockTypeChecker {
    pub fn returning(outcome: TypeCheckOutcome) -> Self {
        Self {
            outcome: Ok(outcome),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A checker that cannot be started at all
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// File lists passed to each run
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TypeChecker for MockTypeChecker {
    fn run(&self, files: &[String]) -> Result<TypeCheckOutcome> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(files.to_vec());
        match &self.outcome {
            Ok(outcome) => Ok(outcome.scoped_to(files)),
            Err(message) => Err(Error::TypeCheck(message.clone())),
        }
    }
}

/// In-memory [`ValidationEnv`] rooted at `/project`.
#[derive(Clone)]
pub struct TestEnv {
    pub fs: MemoryFileSystem,
    pub type_checker: MockTypeChecker,
    pub reporter: RecordingReporter,
    config: FluxcheckConfig,
    layout: ProjectLayout,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub const ROOT: &'static str = "/project";

    pub fn new() -> Self {
        let config = FluxcheckConfig::default();
        Self {
            fs: MemoryFileSystem::new(),
            type_checker: MockTypeChecker::default(),
            reporter: RecordingReporter::new(),
            layout: ProjectLayout::new(Self::ROOT, &config),
            config,
        }
    }

    /// Add a file relative to the project root
    pub fn with_file(self, relative: &str, content: impl Into<String>) -> Self {
        self.fs.insert(self.path(relative), content);
        self
    }

    pub fn with_files<'a>(mut self, files: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        for (relative, content) in files {
            self = self.with_file(relative, content);
        }
        self
    }

    pub fn with_config(mut self, config: FluxcheckConfig) -> Self {
        self.layout = ProjectLayout::new(Self::ROOT, &config);
        self.config = config;
        self
    }

    pub fn with_type_checker(mut self, checker: MockTypeChecker) -> Self {
        self.type_checker = checker;
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.layout.root.join(relative)
    }

    /// Content of a file relative to the project root
    pub fn read(&self, relative: &str) -> Option<String> {
        self.fs.get(self.path(relative))
    }
}

impl ValidationEnv for TestEnv {
    fn file_system(&self) -> &dyn FileSystem {
        &self.fs
    }

    fn type_checker(&self) -> &dyn crate::typecheck::TypeChecker {
        &self.type_checker
    }

    fn reporter(&self) -> &dyn Reporter {
        &self.reporter
    }

    fn config(&self) -> &FluxcheckConfig {
        &self.config
    }

    fn layout(&self) -> &ProjectLayout {
        &self.layout
    }
}
