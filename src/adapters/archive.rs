//! Log message archives.
//!
//! [`LogArchive`] is the read-only view the validators consume.
//! [`LogMessageArchive`] is the in-memory implementation, assembled either
//! from an extracted export directory or entry by entry with
//! [`ArchiveBuilder`].

use crate::domain::constants::CERTIFICATE_NAME_SUFFIX;
use crate::domain::crypto::DeviceCertificate;
use crate::domain::log_message::{LogMessage, LogMessageCodec, ParsingFailure};
use crate::infra::error::{TseError, TseResult};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Read access to the content of one archive.
pub trait LogArchive {
    /// Successfully decoded messages, signature counter ascending. Messages
    /// without a counter follow all counted ones, ordered by filename.
    fn sorted_messages(&self) -> &[Arc<LogMessage>];

    /// Device certificates with their archive filenames.
    fn certificates(&self) -> &[ArchiveCertificate];

    /// Entries that could not be decoded.
    fn parse_failures(&self) -> &[ParsingFailure];

    /// Archive entry name of a message.
    fn entry_filename<'a>(&self, message: &'a LogMessage) -> &'a str {
        message.filename()
    }
}

/// A certificate file found in an archive.
#[derive(Debug, Clone)]
pub struct ArchiveCertificate {
    filename: String,
    certificate: DeviceCertificate,
}

impl ArchiveCertificate {
    #[must_use]
    pub fn new(filename: impl Into<String>, certificate: DeviceCertificate) -> Self {
        Self {
            filename: filename.into(),
            certificate,
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Filename up to the first `.`.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.filename
            .split('.')
            .next()
            .unwrap_or(self.filename.as_str())
    }

    #[must_use]
    pub fn certificate(&self) -> &DeviceCertificate {
        &self.certificate
    }
}

/// How entries of an export directory are recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Extension of log message files, without the dot.
    pub log_extension: String,
    /// Substring of a certificate file stem.
    pub certificate_marker: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            log_extension: "log".to_string(),
            certificate_marker: CERTIFICATE_NAME_SUFFIX.to_string(),
        }
    }
}

enum EntryRole {
    LogMessage,
    Certificate,
    Ignored,
}

impl ArchiveLayout {
    fn classify(&self, filename: &str) -> EntryRole {
        let path = Path::new(filename);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if !self.certificate_marker.is_empty() && stem.contains(&self.certificate_marker) {
            return EntryRole::Certificate;
        }
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.log_extension))
        {
            return EntryRole::LogMessage;
        }
        EntryRole::Ignored
    }
}

/// Immutable in-memory archive.
#[derive(Debug, Default)]
pub struct LogMessageArchive {
    messages: Vec<Arc<LogMessage>>,
    certificates: Vec<ArchiveCertificate>,
    parse_failures: Vec<ParsingFailure>,
}

impl LogMessageArchive {
    /// Load an extracted export directory. Subdirectories are not searched.
    pub fn from_dir(
        path: &Path,
        codec: &LogMessageCodec,
        layout: &ArchiveLayout,
    ) -> TseResult<Self> {
        log::info!("Loading archive directory {}", path.display());

        let entries = fs::read_dir(path).map_err(|e| {
            TseError::ArchiveError(format!("Failed to read directory {}: {e}", path.display()))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                TseError::ArchiveError(format!("Failed to read directory entry: {e}"))
            })?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => files.push((name.to_string(), entry.path())),
                None => log::warn!("Skipping non UTF-8 file name {:?}", entry.file_name()),
            }
        }
        files.sort();

        let mut builder = ArchiveBuilder::new();
        for (name, file_path) in files {
            match layout.classify(&name) {
                EntryRole::Certificate => {
                    let bytes = fs::read(&file_path)?;
                    let certificate = DeviceCertificate::from_bytes(&bytes).map_err(|e| {
                        TseError::CertificateError(format!("{name}: {e}"))
                    })?;
                    builder.add_certificate(name, certificate);
                }
                EntryRole::LogMessage => {
                    let bytes = fs::read(&file_path)?;
                    builder.add_entry(name, bytes);
                }
                EntryRole::Ignored => log::debug!("Ignoring archive entry {name}"),
            }
        }

        Ok(builder.build(codec))
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of log message entries, decoded or not.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.messages.len() + self.parse_failures.len()
    }
}

impl LogArchive for LogMessageArchive {
    fn sorted_messages(&self) -> &[Arc<LogMessage>] {
        &self.messages
    }

    fn certificates(&self) -> &[ArchiveCertificate] {
        &self.certificates
    }

    fn parse_failures(&self) -> &[ParsingFailure] {
        &self.parse_failures
    }
}

/// Collects raw entries and certificates, then decodes them into a
/// [`LogMessageArchive`].
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
    certificates: Vec<ArchiveCertificate>,
}

impl ArchiveBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, filename: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.entries.push((filename.into(), bytes));
        self
    }

    pub fn add_certificate(
        &mut self,
        filename: impl Into<String>,
        certificate: DeviceCertificate,
    ) -> &mut Self {
        self.certificates
            .push(ArchiveCertificate::new(filename, certificate));
        self
    }

    /// Decode every entry. Entries that fail to decode are kept as parse
    /// failures.
    #[must_use]
    pub fn build(&self, codec: &LogMessageCodec) -> LogMessageArchive {
        let mut entries: Vec<&(String, Vec<u8>)> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut messages = Vec::with_capacity(entries.len());
        let mut parse_failures = Vec::new();
        for (filename, bytes) in entries {
            match codec.decode(bytes, filename) {
                Ok(message) => messages.push(Arc::new(message)),
                Err(failure) => {
                    log::warn!("{failure}");
                    parse_failures.push(failure);
                }
            }
        }
        messages.sort_by(|a, b| counter_order(a, b));

        let mut certificates = self.certificates.clone();
        certificates.sort_by(|a, b| a.filename.cmp(&b.filename));

        log::info!(
            "Archive holds {} log messages, {} unparseable entries, {} certificates",
            messages.len(),
            parse_failures.len(),
            certificates.len()
        );

        LogMessageArchive {
            messages,
            certificates,
            parse_failures,
        }
    }
}

fn counter_order(a: &LogMessage, b: &LogMessage) -> Ordering {
    match (a.signature_counter(), b.signature_counter()) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.filename().cmp(b.filename())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.filename().cmp(b.filename()),
    }
}
