//! Archive validators.
//!
//! Each validator inspects a whole [`LogArchive`] and returns its findings.
//! Expected defects of the archive content are findings; `Err` is reserved
//! for faults that stop the run.

mod aggregated;
mod certificate_file_name;
mod signature;
mod timestamp;

pub use aggregated::AggregatedValidator;
pub use certificate_file_name::{CertificateFileNameValidator, CertificateNaming, KeySerialNaming};
pub use signature::SignatureValidator;
pub use timestamp::TimestampValidator;

use crate::adapters::archive::LogArchive;
use crate::domain::validation::ValidationFailure;
use crate::infra::error::TseResult;

/// One check over an archive.
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    fn validate(&self, archive: &dyn LogArchive) -> TseResult<Vec<ValidationFailure>>;
}
