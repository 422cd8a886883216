//! Service layer: signature verification and archive validators.

pub mod signature_verifier;
pub mod validators;

pub use signature_verifier::SignatureVerifier;
pub use validators::{
    AggregatedValidator, CertificateFileNameValidator, CertificateNaming, KeySerialNaming,
    SignatureValidator, TimestampValidator, Validator,
};
