//! Error types for archive validation runs.
//!
//! Structural defects of single log messages (`ParsingFailure`), signature
//! verification outcomes (`VerificationFailure`) and validator findings
//! (`ValidationFailure`) are ordinary values and live next to the code that
//! produces them. `TseError` is reserved for faults that end a run.

use thiserror::Error;

/// Result type for fallible crate operations
pub type TseResult<T> = Result<T, TseError>;

/// Errors that abort an operation instead of being collected as findings
#[derive(Error, Debug, miette::Diagnostic)]
pub enum TseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("ASN.1 encoding/decoding error: {0}")]
    Asn1Error(String),

    #[error("Cryptographic error: {0}")]
    CryptographicError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::io::Error> for TseError {
    fn from(error: std::io::Error) -> Self {
        TseError::IoError(error.to_string())
    }
}

impl From<der::Error> for TseError {
    fn from(error: der::Error) -> Self {
        TseError::Asn1Error(error.to_string())
    }
}

impl From<openssl::error::ErrorStack> for TseError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        TseError::CryptographicError(error.to_string())
    }
}

impl From<toml::de::Error> for TseError {
    fn from(error: toml::de::Error) -> Self {
        TseError::ConfigurationError(format!("Failed to parse config file: {error}"))
    }
}

impl From<toml::ser::Error> for TseError {
    fn from(error: toml::ser::Error) -> Self {
        TseError::ConfigurationError(format!("Failed to serialize config: {error}"))
    }
}
