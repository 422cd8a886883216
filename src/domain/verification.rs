//! Outcome of verifying the signature of a single log message.

use thiserror::Error;

/// Why a log message signature did not verify.
///
/// These are expected outcomes of checking untrusted data and are collected
/// as findings; they never abort a validation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("signature algorithm {0} is not supported")]
    UnsupportedAlgorithm(String),

    #[error("no certificate with key serial {0}")]
    NoCertificateForSerial(String),

    #[error("signature has {actual} bytes, expected {expected}")]
    MalformedSignature { expected: usize, actual: usize },

    #[error("signature does not match the signed data")]
    SignatureMismatch,

    #[error("unsupported public key: {0}")]
    UnsupportedKey(String),

    #[error("cryptographic backend error: {0}")]
    Crypto(String),
}

impl From<openssl::error::ErrorStack> for VerificationFailure {
    fn from(error: openssl::error::ErrorStack) -> Self {
        VerificationFailure::Crypto(error.to_string())
    }
}
