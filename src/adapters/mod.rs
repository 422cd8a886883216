//! Adapter layer: archive sources feeding the validators.

pub mod archive;

pub use archive::{
    ArchiveBuilder, ArchiveCertificate, ArchiveLayout, LogArchive, LogMessageArchive,
};
