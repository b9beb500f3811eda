//! External type-checker collaborator.
//!
//! The compiler is a black box: it is run once per pipeline, its combined
//! output is split into lines and any line containing `error TS` counts as a
//! diagnostic. Diagnostics are attributed to endpoints by file path.

use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::TypeCheckConfig;
use crate::errors::{Error, Result};

const DIAGNOSTIC_MARKER: &str = "error TS";
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCheckStatus {
    Clean,
    Diagnostics,
    Timeout,
    /// Non-zero exit without any recognizable diagnostic
    Unparseable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCheckOutcome {
    pub status: TypeCheckStatus,
    pub diagnostics: Vec<String>,
}

impl TypeCheckOutcome {
    pub fn clean() -> Self {
        Self {
            status: TypeCheckStatus::Clean,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(diagnostics: Vec<String>) -> Self {
        let status = if diagnostics.is_empty() {
            TypeCheckStatus::Clean
        } else {
            TypeCheckStatus::Diagnostics
        };
        Self {
            status,
            diagnostics,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            status: TypeCheckStatus::Timeout,
            diagnostics: vec![format!("type checker timed out after {}s", after.as_secs())],
        }
    }

    pub fn unparseable(output: &str) -> Self {
        let tail: Vec<&str> = output.lines().rev().take(5).collect();
        let detail = tail.into_iter().rev().collect::<Vec<_>>().join(" | ");
        Self {
            status: TypeCheckStatus::Unparseable,
            diagnostics: vec![format!("type checker failed with unparseable output: {}", detail)],
        }
    }

    /// Timeouts and unparseable failures invalidate every dimension
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.status,
            TypeCheckStatus::Timeout | TypeCheckStatus::Unparseable
        )
    }

    /// Diagnostics that mention one of `files` (project-relative paths)
    pub fn diagnostics_for(&self, files: &[String]) -> Vec<String> {
        if self.status != TypeCheckStatus::Diagnostics {
            return Vec::new();
        }
        self.diagnostics
            .iter()
            .filter(|line| {
                let line = line.replace('\\', "/");
                files.iter().any(|f| mentions_file(&line, f))
            })
            .cloned()
            .collect()
    }

    /// Keep only diagnostics for `files`; a check with none left is clean
    pub fn scoped_to(&self, files: &[String]) -> Self {
        if self.status != TypeCheckStatus::Diagnostics {
            return self.clone();
        }
        Self::with_diagnostics(self.diagnostics_for(files))
    }
}

/// `file` appears as a whole path: preceded by nothing, whitespace or `/`, and
/// followed by the `(line,col)` or `:line` position tsc prints.
fn mentions_file(line: &str, file: &str) -> bool {
    line.match_indices(file).any(|(at, _)| {
        let before = line[..at].chars().next_back();
        let after = line[at + file.len()..].chars().next();
        let starts = match before {
            None | Some('/') => true,
            Some(c) => c.is_whitespace(),
        };
        starts && matches!(after, Some('(' | ':'))
    })
}

/// Runs the type checker over the files of the current scope.
pub trait TypeChecker: Send + Sync {
    /// `files` are project-relative paths of every in-scope artifact
    fn run(&self, files: &[String]) -> Result<TypeCheckOutcome>;
}

/// Spawns the configured compiler command in the project root.
pub struct ProcessTypeChecker {
    root: PathBuf,
    command: Vec<String>,
    timeout: Duration,
}

impl ProcessTypeChecker {
    pub fn new(root: impl Into<PathBuf>, config: &TypeCheckConfig) -> Self {
        Self {
            root: root.into(),
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn capture(&self) -> Result<Option<(bool, String)>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::TypeCheck("empty type checker command".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::TypeCheck(format!("failed to run '{}': {}", program, e)))?;

        let readers: Vec<_> = [child.stdout.take().map(drain), child.stderr.take().map(drain)]
            .into_iter()
            .flatten()
            .collect();

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let partial = join_within(readers, DRAIN_GRACE);
                    tracing::warn!(timeout_secs = self.timeout.as_secs(), "Type checker timed out");
                    tracing::debug!(output = %partial, "Output captured before timeout");
                    return Ok(None);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(Error::TypeCheck(format!("failed to poll '{}': {}", program, e)));
                }
            }
        };

        let output: String = readers
            .into_iter()
            .map(|reader| reader.join().unwrap_or_default())
            .collect();
        Ok(Some((status.success(), output)))
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = pipe.read_to_string(&mut buf);
        buf
    })
}

/// Join readers that finish within `grace`. A grandchild of a killed checker
/// can hold a pipe open indefinitely; its reader is left detached.
fn join_within(readers: Vec<thread::JoinHandle<String>>, grace: Duration) -> String {
    let deadline = Instant::now() + grace;
    while readers.iter().any(|r| !r.is_finished()) && Instant::now() < deadline {
        thread::sleep(POLL_INTERVAL);
    }
    let mut output = String::new();
    for reader in readers {
        if reader.is_finished() {
            output.push_str(&reader.join().unwrap_or_default());
        } else {
            tracing::debug!("Type checker pipe still open after kill");
        }
    }
    output
}

/// Classify raw compiler output
pub fn parse_output(success: bool, output: &str) -> TypeCheckOutcome {
    let diagnostics: Vec<String> = output
        .lines()
        .filter(|line| line.contains(DIAGNOSTIC_MARKER))
        .map(|line| line.trim().to_string())
        .collect();

    match (success, diagnostics.is_empty()) {
        (true, true) => TypeCheckOutcome::clean(),
        (_, false) => TypeCheckOutcome::with_diagnostics(diagnostics),
        (false, true) => TypeCheckOutcome::unparseable(output),
    }
}

impl TypeChecker for ProcessTypeChecker {
    fn run(&self, files: &[String]) -> Result<TypeCheckOutcome> {
        let started = Instant::now();
        let outcome = match self.capture()? {
            Some((success, output)) => parse_output(success, &output).scoped_to(files),
            None => TypeCheckOutcome::timeout(self.timeout),
        };
        tracing::debug!(
            status = ?outcome.status,
            diagnostics = outcome.diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Type check finished"
        );
        Ok(outcome)
    }
}
