//! Signature counter continuity and log time monotonicity.

use super::Validator;
use crate::adapters::archive::LogArchive;
use crate::domain::log_message::LogMessage;
use crate::domain::validation::{FailureKind, ValidationFailure};
use crate::infra::error::{TseError, TseResult};
use std::cmp::Ordering;
use std::sync::Arc;

/// Walks the counter-sorted messages pairwise.
///
/// Counted messages must increase by exactly one; log times must never go
/// backwards. Messages without a counter are put in log time order and only
/// take part in the time check, among themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampValidator;

impl TimestampValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_counter(
        previous: &Arc<LogMessage>,
        current: &Arc<LogMessage>,
        failures: &mut Vec<ValidationFailure>,
    ) -> TseResult<()> {
        let (Some(prev), Some(cur)) = (previous.signature_counter(), current.signature_counter())
        else {
            return Ok(());
        };
        if cur == prev {
            failures.push(ValidationFailure::for_pair(
                FailureKind::DuplicateCounter,
                current,
                previous,
                format!("signature counter {cur} is used twice"),
            ));
        } else if !cur.is_successor_of(prev).map_err(|e| {
            TseError::CryptographicError(format!("Failed to compare signature counters: {e}"))
        })? {
            failures.push(ValidationFailure::for_pair(
                FailureKind::CounterGap,
                current,
                previous,
                format!("signature counter jumps from {prev} to {cur}"),
            ));
        }
        Ok(())
    }

    fn check_time(
        previous: &Arc<LogMessage>,
        current: &Arc<LogMessage>,
        failures: &mut Vec<ValidationFailure>,
    ) {
        match previous.log_time().compare(current.log_time()) {
            Ok(Ordering::Greater) => failures.push(ValidationFailure::for_pair(
                FailureKind::TimeRegression,
                current,
                previous,
                format!(
                    "log time {} is earlier than {}",
                    current.log_time(),
                    previous.log_time()
                ),
            )),
            Ok(_) => {}
            Err(e) => failures.push(ValidationFailure::for_pair(
                FailureKind::UnreadableLogTime,
                current,
                previous,
                e.to_string(),
            )),
        }
    }
}

impl Validator for TimestampValidator {
    fn name(&self) -> &str {
        "TimestampValidator"
    }

    fn validate(&self, archive: &dyn LogArchive) -> TseResult<Vec<ValidationFailure>> {
        let (counted, mut uncounted): (Vec<&Arc<LogMessage>>, Vec<&Arc<LogMessage>>) = archive
            .sorted_messages()
            .iter()
            .partition(|m| m.signature_counter().is_some());
        // No counter to order by; unreadable times sort first and are
        // reported by the pairwise check.
        uncounted.sort_by_cached_key(|m| {
            (m.log_time().to_datetime().ok(), m.filename().to_string())
        });

        let mut failures = Vec::new();
        for pair in counted.windows(2) {
            Self::check_counter(pair[0], pair[1], &mut failures)?;
            Self::check_time(pair[0], pair[1], &mut failures);
        }
        for pair in uncounted.windows(2) {
            Self::check_time(pair[0], pair[1], &mut failures);
        }

        for failure in &failures {
            log::debug!("{failure}");
        }
        Ok(failures)
    }
}
