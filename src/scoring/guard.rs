use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::dimension::{Dimension, DimensionScore};
use crate::errors::Result;

/// Run one dimension scorer, converting errors and panics into a FAIL/0 score.
///
/// A failure in one dimension never prevents sibling dimensions from being
/// computed.
pub fn guarded<F>(dimension: Dimension, scorer: F) -> DimensionScore
where
    F: FnOnce() -> Result<DimensionScore>,
{
    match panic::catch_unwind(AssertUnwindSafe(scorer)) {
        Ok(Ok(score)) => score,
        Ok(Err(e)) => {
            tracing::warn!(dimension = %dimension, error = %e, "Dimension scoring failed");
            DimensionScore::crashed(format!("{} check failed: {}", dimension.label(), e))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(dimension = %dimension, %message, "Dimension scorer panicked");
            DimensionScore::crashed(format!("{} check crashed: {}", dimension.label(), message))
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::scoring::Status;

    #[test]
    fn test_error_becomes_failed_dimension() {
        let score = guarded(Dimension::CodeQuality, || {
            Err(Error::scoring("code_quality", "regex blew up"))
        });
        assert_eq!(score.status, Status::Fail);
        assert_eq!(score.score, 0);
        assert!(score.issues[0].contains("regex blew up"));
    }

    #[test]
    fn test_panic_becomes_failed_dimension() {
        let score = guarded(Dimension::LintValidation, || panic!("index out of range"));
        assert_eq!(score.status, Status::Fail);
        assert_eq!(score.score, 0);
        assert_eq!(score.issues, vec!["lint check crashed: index out of range"]);
    }

    #[test]
    fn test_success_passes_through() {
        let score = guarded(Dimension::TestValidation, || Ok(DimensionScore::pass()));
        assert_eq!(score, DimensionScore::pass());
    }
}
