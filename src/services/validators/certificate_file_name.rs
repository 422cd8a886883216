use super::Validator;
use crate::adapters::archive::LogArchive;
use crate::domain::constants::CERTIFICATE_NAME_SUFFIX;
use crate::domain::crypto::DeviceCertificate;
use crate::domain::validation::{FailureKind, ValidationFailure};
use crate::infra::error::TseResult;
use std::sync::Arc;

/// Supplies the filename stem a certificate must be stored under.
pub trait CertificateNaming: Send + Sync {
    fn expected_stem(&self, certificate: &DeviceCertificate) -> String;
}

/// `<UPPER-HEX key serial><suffix>`, the suffix defaulting to `_X509`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySerialNaming {
    suffix: String,
}

impl Default for KeySerialNaming {
    fn default() -> Self {
        Self::with_suffix(CERTIFICATE_NAME_SUFFIX)
    }
}

impl KeySerialNaming {
    #[must_use]
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl CertificateNaming for KeySerialNaming {
    fn expected_stem(&self, certificate: &DeviceCertificate) -> String {
        format!(
            "{}{}",
            hex::encode_upper(certificate.key_serial()),
            self.suffix
        )
    }
}

/// Checks that every certificate is stored under the name derived from its key.
pub struct CertificateFileNameValidator {
    naming: Arc<dyn CertificateNaming>,
}

impl Default for CertificateFileNameValidator {
    fn default() -> Self {
        Self::new(Arc::new(KeySerialNaming::default()))
    }
}

impl CertificateFileNameValidator {
    #[must_use]
    pub fn new(naming: Arc<dyn CertificateNaming>) -> Self {
        Self { naming }
    }
}

impl Validator for CertificateFileNameValidator {
    fn name(&self) -> &str {
        "CertificateFileNameValidator"
    }

    fn validate(&self, archive: &dyn LogArchive) -> TseResult<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        for entry in archive.certificates() {
            let expected = self.naming.expected_stem(entry.certificate());
            if !entry.file_stem().eq_ignore_ascii_case(&expected) {
                log::debug!("Certificate {} should be named {expected}", entry.filename());
                failures.push(ValidationFailure::archive_level(
                    FailureKind::CertificateFileName,
                    format!(
                        "certificate file {} does not match key serial, expected {expected}",
                        entry.filename()
                    ),
                ));
            }
        }
        Ok(failures)
    }
}
