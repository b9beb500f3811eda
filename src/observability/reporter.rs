use std::time::Duration;

/// Leveled sink for pipeline events.
///
/// Implementations must be `Send + Sync`: endpoint validation may report
/// from rayon worker threads.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// A named check passed for `subject` (usually `feature/endpoint`)
    fn check_pass(&self, subject: &str, detail: &str);

    fn check_fail(&self, subject: &str, detail: &str);

    fn stage_started(&self, stage: &str);

    fn stage_finished(&self, stage: &str, passed: bool, duration: Duration);
}

/// Forwards every event to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn check_pass(&self, subject: &str, detail: &str) {
        tracing::info!(subject, result = "pass", "{}", detail);
    }

    fn check_fail(&self, subject: &str, detail: &str) {
        tracing::warn!(subject, result = "fail", "{}", detail);
    }

    fn stage_started(&self, stage: &str) {
        tracing::info!(stage, "Stage started");
    }

    fn stage_finished(&self, stage: &str, passed: bool, duration: Duration) {
        let elapsed_ms = duration.as_millis() as u64;
        if passed {
            tracing::info!(stage, elapsed_ms, "Stage passed");
        } else {
            tracing::warn!(stage, elapsed_ms, "Stage failed");
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn check_pass(&self, _subject: &str, _detail: &str) {}
    fn check_fail(&self, _subject: &str, _detail: &str) {}
    fn stage_started(&self, _stage: &str) {}
    fn stage_finished(&self, _stage: &str, _passed: bool, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn Reporter) {}

    #[test]
    fn test_reporters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingReporter>();
        assert_send_sync::<SilentReporter>();
    }
}
