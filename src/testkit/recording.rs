use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::observability::Reporter;

/// Event captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Info(String),
    Warn(String),
    Error(String),
    CheckPass { subject: String, detail: String },
    CheckFail { subject: String, detail: String },
    StageStarted(String),
    StageFinished { stage: String, passed: bool },
}

/// Reporter that keeps every event in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of stages in the order they started
    pub fn started_stages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::StageStarted(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    pub fn failed_checks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::CheckFail { subject, .. } => Some(subject),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(ReportEvent::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(ReportEvent::Warn(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(ReportEvent::Error(message.to_string()));
    }

    fn check_pass(&self, subject: &str, detail: &str) {
        self.push(ReportEvent::CheckPass {
            subject: subject.to_string(),
            detail: detail.to_string(),
        });
    }

    fn check_fail(&self, subject: &str, detail: &str) {
        self.push(ReportEvent::CheckFail {
            subject: subject.to_string(),
            detail: detail.to_string(),
        });
    }

    fn stage_started(&self, stage: &str) {
        self.push(ReportEvent::StageStarted(stage.to_string()));
    }

    fn stage_finished(&self, stage: &str, passed: bool, _duration: Duration) {
        self.push(ReportEvent::StageFinished {
            stage: stage.to_string(),
            passed,
        });
    }
}
