//! Validator findings and their aggregation.

use crate::domain::log_message::LogMessage;
use crate::domain::verification::VerificationFailure;
use std::fmt;
use std::sync::Arc;

/// Category of a validator finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidSignature,
    CounterGap,
    DuplicateCounter,
    TimeRegression,
    UnreadableLogTime,
    CertificateFileName,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidSignature => "invalid-signature",
            FailureKind::CounterGap => "counter-gap",
            FailureKind::DuplicateCounter => "duplicate-counter",
            FailureKind::TimeRegression => "time-regression",
            FailureKind::UnreadableLogTime => "unreadable-log-time",
            FailureKind::CertificateFileName => "certificate-file-name",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding. Tied to a message (and possibly a peer message), or to the
/// archive as a whole when `message` is `None`.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    kind: FailureKind,
    message: Option<Arc<LogMessage>>,
    peer: Option<Arc<LogMessage>>,
    detail: String,
    cause: Option<VerificationFailure>,
}

impl ValidationFailure {
    #[must_use]
    pub fn for_message(
        kind: FailureKind,
        message: &Arc<LogMessage>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: Some(Arc::clone(message)),
            peer: None,
            detail: detail.into(),
            cause: None,
        }
    }

    /// Finding about two neighbouring messages; `message` is the later one.
    #[must_use]
    pub fn for_pair(
        kind: FailureKind,
        message: &Arc<LogMessage>,
        peer: &Arc<LogMessage>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            peer: Some(Arc::clone(peer)),
            ..Self::for_message(kind, message, detail)
        }
    }

    #[must_use]
    pub fn archive_level(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: None,
            peer: None,
            detail: detail.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: VerificationFailure) -> Self {
        self.cause = Some(cause);
        self
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> Option<&Arc<LogMessage>> {
        self.message.as_ref()
    }

    #[must_use]
    pub fn peer(&self) -> Option<&Arc<LogMessage>> {
        self.peer.as_ref()
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn cause(&self) -> Option<&VerificationFailure> {
        self.cause.as_ref()
    }

    /// True if the finding names `message` either as subject or as peer.
    #[must_use]
    pub fn concerns(&self, message: &LogMessage) -> bool {
        let same = |m: &Arc<LogMessage>| std::ptr::eq(Arc::as_ptr(m), message);
        self.message.as_ref().is_some_and(same) || self.peer.as_ref().is_some_and(same)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        match (&self.message, &self.peer) {
            (Some(m), Some(p)) => write!(f, " {} (after {})", m.filename(), p.filename())?,
            (Some(m), None) => write!(f, " {}", m.filename())?,
            _ => {}
        }
        write!(f, ": {}", self.detail)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

/// Ordered findings of one validation run together with the names of the
/// validators that ran.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    failures: Vec<ValidationFailure>,
    validators: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `validator` ran and append its findings.
    pub fn record(&mut self, validator: &str, failures: Vec<ValidationFailure>) {
        self.validators.push(validator.to_string());
        self.failures.extend(failures);
    }

    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    #[must_use]
    pub fn validators(&self) -> &[String] {
        &self.validators
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Findings that name `message`.
    pub fn failures_for<'a>(
        &'a self,
        message: &'a LogMessage,
    ) -> impl Iterator<Item = &'a ValidationFailure> + 'a {
        self.failures.iter().filter(move |f| f.concerns(message))
    }

    /// Findings not tied to a message.
    pub fn archive_level_failures(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| f.message.is_none())
    }

    #[must_use]
    pub fn count_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_level_findings_are_grouped() {
        let mut result = ValidationResult::new();
        result.record(
            "CertificateFileNameValidator",
            vec![ValidationFailure::archive_level(
                FailureKind::CertificateFileName,
                "device.pem should be named ABCD_X509",
            )],
        );
        result.record("SignatureValidator", Vec::new());

        assert_eq!(result.len(), 1);
        assert!(!result.is_valid());
        assert_eq!(
            result.validators(),
            &["CertificateFileNameValidator", "SignatureValidator"]
        );
        assert_eq!(result.archive_level_failures().count(), 1);
        assert_eq!(result.count_of(FailureKind::CertificateFileName), 1);
        assert_eq!(
            result.failures()[0].to_string(),
            "[certificate-file-name]: device.pem should be named ABCD_X509"
        );
    }
}
