//! Workflow pipelines orchestrating stateless services.

pub mod validate;

pub use validate::{ArchiveReport, ReportDisplay, ReportSummary, ValidateWorkflow};
