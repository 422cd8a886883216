//! TSE Log Validator Library
//!
//! Decodes the log messages exported by a TSE (the technical security device
//! of German fiscal cash registers), verifies their signatures against the
//! device certificates and validates an export as a whole: signature counter
//! continuity, log time monotonicity and certificate file names.
//!
//! Layers:
//! - `domain`: TLV cursor, OID registry, log message model and codec,
//!   certificate and algorithm types, findings
//! - `services`: signature verifier and validators
//! - `adapters`: archives (in memory or loaded from a directory)
//! - `pipelines`: the validation workflow
//! - `infra`: configuration and the crate error type

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use infra::{config, error};

pub use adapters::archive::{
    ArchiveBuilder, ArchiveCertificate, ArchiveLayout, LogArchive, LogMessageArchive,
};
pub use domain::crypto::{DeviceCertificate, DigestAlgorithm, SignatureAlgorithm, SignatureScheme};
pub use domain::log_message::{
    CertifiedDataHandler, CertifiedDataType, LogBody, LogMessage, LogMessageCodec, LogTime,
    ParseErrorKind, ParsingFailure, SignatureCounter, ALLOWED_SIGNATURE_ALGORITHMS,
};
pub use domain::oid::{BsiOidRegistry, OidResolver, ResolvedOid, UnknownOid};
pub use domain::validation::{FailureKind, ValidationFailure, ValidationResult};
pub use domain::verification::VerificationFailure;
pub use error::{TseError, TseResult};
pub use pipelines::validate::{ArchiveReport, ValidateWorkflow};
pub use services::signature_verifier::SignatureVerifier;
pub use services::validators::{
    AggregatedValidator, CertificateFileNameValidator, CertificateNaming, KeySerialNaming,
    SignatureValidator, TimestampValidator, Validator,
};
