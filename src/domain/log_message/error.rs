//! Structural parse failures of single log messages.

use crate::domain::oid::UnknownOid;
use crate::domain::tlv::TlvError;
use thiserror::Error;

/// Why a log message could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("log message is not a single SEQUENCE: {0}")]
    MalformedEnvelope(String),

    #[error("malformed element: {0}")]
    Malformed(#[from] TlvError),

    #[error("version element is missing")]
    VersionMissing,

    #[error("certifiedDataType element is missing")]
    CertifiedDataTypeMissing,

    #[error(transparent)]
    UnknownOid(#[from] UnknownOid),

    #[error("certifiedDataType {0} is not allowed")]
    DisallowedCertifiedDataType(String),

    #[error("input ended while reading certifiedData")]
    CertifiedDataIncomplete,

    #[error("serialNumber element is missing")]
    SerialNumberMissing,

    #[error("serialNumber is empty")]
    EmptySerialNumber,

    #[error("signatureAlgorithm element is missing")]
    SignatureAlgorithmMissing,

    #[error("signatureAlgorithm {0} is not allowed")]
    DisallowedAlgorithm(String),

    #[error("signatureCounter element is missing")]
    SignatureCounterMissing,

    #[error("signatureCounter must be a non-negative integer")]
    InvalidSignatureCounter,

    #[error("logTime element is missing")]
    LogTimeMissing,

    #[error("logTime is invalid: {0}")]
    InvalidLogTime(String),

    #[error("signatureValue element is missing")]
    SignatureMissing,

    #[error("unexpected data after signatureValue")]
    TrailingData,

    #[error("version is {0}, expected 2")]
    InvalidVersion(String),

    #[error("certifiedData is invalid: {0}")]
    InvalidCertifiedData(String),

    #[error("seAuditData is required for audit log messages")]
    SeAuditDataMissing,

    #[error("seAuditData is only allowed in audit log messages")]
    UnexpectedSeAuditData,
}

/// A log message entry that could not be parsed. Reported once per entry as
/// an archive defect; it never reaches the validators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse log message {filename}: {kind}")]
pub struct ParsingFailure {
    pub filename: String,
    pub kind: ParseErrorKind,
}

impl ParsingFailure {
    #[must_use]
    pub fn new(filename: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            filename: filename.into(),
            kind,
        }
    }
}
