//! `ValidateWorkflow`: load an archive, run the configured validators and
//! produce an [`ArchiveReport`].
//!
//! Parse failures and validator findings stay separate so a caller can tell
//! "N of M entries could not be parsed" apart from "K findings".

use crate::adapters::archive::{ArchiveLayout, LogArchive, LogMessageArchive};
use crate::domain::log_message::{LogMessageCodec, ParsingFailure};
use crate::domain::validation::ValidationResult;
use crate::infra::config::ValidatorConfiguration;
use crate::infra::error::TseResult;
use crate::services::validators::AggregatedValidator;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Orchestrates decoding and validation of one archive at a time.
pub struct ValidateWorkflow {
    codec: LogMessageCodec,
    validator: AggregatedValidator,
    layout: ArchiveLayout,
}

impl Default for ValidateWorkflow {
    fn default() -> Self {
        Self::from_config(&ValidatorConfiguration::default())
    }
}

impl ValidateWorkflow {
    #[must_use]
    pub fn new(codec: LogMessageCodec, validator: AggregatedValidator, layout: ArchiveLayout) -> Self {
        Self {
            codec,
            validator,
            layout,
        }
    }

    #[must_use]
    pub fn from_config(config: &ValidatorConfiguration) -> Self {
        Self::new(
            LogMessageCodec::default(),
            config.build_validator(),
            config.archive_layout(),
        )
    }

    #[must_use]
    pub fn codec(&self) -> &LogMessageCodec {
        &self.codec
    }

    /// Validate an extracted export directory.
    pub fn run_dir(&self, path: &Path) -> TseResult<ArchiveReport> {
        let archive = LogMessageArchive::from_dir(path, &self.codec, &self.layout)?;
        self.run(path.display().to_string(), archive)
    }

    /// Validate an archive that is already loaded.
    pub fn run(&self, source: impl Into<String>, archive: LogMessageArchive) -> TseResult<ArchiveReport> {
        let source = source.into();
        log::info!("Validating {source}");
        let result = self.validator.validate_all(&archive)?;
        let report = ArchiveReport {
            source,
            archive,
            result,
        };
        log::info!("{}", report.summary());
        Ok(report)
    }
}

/// Outcome of validating one archive.
#[derive(Debug)]
pub struct ArchiveReport {
    source: String,
    archive: LogMessageArchive,
    result: ValidationResult,
}

impl ArchiveReport {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn archive(&self) -> &LogMessageArchive {
        &self.archive
    }

    #[must_use]
    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    #[must_use]
    pub fn parse_failures(&self) -> &[ParsingFailure] {
        self.archive.parse_failures()
    }

    /// No parse failures and no findings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.parse_failures().is_empty() && self.result.is_valid()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} of {} entries could not be parsed, {} finding(s) from {} validator(s)",
            self.source,
            self.parse_failures().len(),
            self.archive.entry_count(),
            self.result.len(),
            self.result.validators().len()
        )
    }

    /// Human-readable report grouped by message, archive level findings
    /// first.
    #[must_use]
    pub fn render(&self, only_failures: bool) -> String {
        self.display(only_failures).to_string()
    }

    /// [`fmt::Display`] view of [`ArchiveReport::render`].
    #[must_use]
    pub fn display(&self, only_failures: bool) -> ReportDisplay<'_> {
        ReportDisplay {
            report: self,
            only_failures,
        }
    }

    /// Serializable digest of the report.
    #[must_use]
    pub fn to_summary(&self) -> ReportSummary {
        ReportSummary {
            source: self.source.clone(),
            entries: self.archive.entry_count(),
            parsed: self.archive.message_count(),
            certificates: self.archive.certificates().len(),
            validators: self.result.validators().to_vec(),
            parse_failures: self
                .parse_failures()
                .iter()
                .map(|f| ParseFailureSummary {
                    filename: f.filename.clone(),
                    reason: f.kind.to_string(),
                })
                .collect(),
            findings: self
                .result
                .failures()
                .iter()
                .map(|f| FindingSummary {
                    kind: f.kind().as_str().to_string(),
                    message: f.message().map(|m| m.filename().to_string()),
                    peer: f.peer().map(|m| m.filename().to_string()),
                    detail: f.detail().to_string(),
                    cause: f.cause().map(ToString::to_string),
                })
                .collect(),
        }
    }
}

/// Text rendering of an [`ArchiveReport`].
pub struct ReportDisplay<'a> {
    report: &'a ArchiveReport,
    only_failures: bool,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "Archive {}", report.source)?;
        writeln!(f, "  certificates:")?;
        for cert in report.archive.certificates() {
            writeln!(
                f,
                "    {} ({})",
                cert.filename(),
                cert.certificate().key_serial_hex()
            )?;
        }

        for failure in report.result.archive_level_failures() {
            writeln!(f, "  {failure}")?;
        }

        if !report.parse_failures().is_empty() {
            writeln!(f, "  unparseable entries:")?;
            for failure in report.parse_failures() {
                writeln!(f, "    {}: {}", failure.filename, failure.kind)?;
            }
        }

        writeln!(f, "  log messages:")?;
        for message in report.archive.sorted_messages() {
            let findings: Vec<_> = report.result.failures_for(message).collect();
            if self.only_failures && findings.is_empty() {
                continue;
            }
            let status = if findings.is_empty() { "ok" } else { "FAILED" };
            writeln!(f, "    {} [{status}]", message.filename())?;
            for finding in findings {
                writeln!(f, "      {finding}")?;
            }
        }
        write!(f, "  {}", report.summary())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub source: String,
    pub entries: usize,
    pub parsed: usize,
    pub certificates: usize,
    pub validators: Vec<String>,
    pub parse_failures: Vec<ParseFailureSummary>,
    pub findings: Vec<FindingSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseFailureSummary {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindingSummary {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}
