use super::Validator;
use crate::adapters::archive::LogArchive;
use crate::domain::validation::{FailureKind, ValidationFailure};
use crate::infra::error::TseResult;
use crate::services::signature_verifier::SignatureVerifier;

/// Verifies the signature of every decoded message with the archive's
/// certificates.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureValidator;

impl SignatureValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for SignatureValidator {
    fn name(&self) -> &str {
        "SignatureValidator"
    }

    fn validate(&self, archive: &dyn LogArchive) -> TseResult<Vec<ValidationFailure>> {
        let verifier = SignatureVerifier::new(
            archive
                .certificates()
                .iter()
                .map(|c| c.certificate().clone()),
        );

        let mut failures = Vec::new();
        for message in archive.sorted_messages() {
            if let Err(cause) = verifier.verify(message) {
                log::debug!("Signature of {} rejected: {cause}", message.filename());
                failures.push(
                    ValidationFailure::for_message(
                        FailureKind::InvalidSignature,
                        message,
                        format!(
                            "signature of {} does not verify",
                            archive.entry_filename(message)
                        ),
                    )
                    .with_cause(cause),
                );
            }
        }
        Ok(failures)
    }
}
