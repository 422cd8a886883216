//! Configuration management infrastructure.
//!
//! The configuration file selects which validators run, how an export
//! directory is laid out and how reports are printed.

use crate::adapters::archive::ArchiveLayout;
use crate::infra::error::{TseError, TseResult};
use crate::services::validators::{
    AggregatedValidator, CertificateFileNameValidator, KeySerialNaming, SignatureValidator,
    TimestampValidator,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValidatorConfiguration {
    pub validators: ValidatorSelection,
    pub archive: ArchiveSettings,
    pub report: ReportSettings,
}

/// Validators to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSelection {
    pub signature: bool,
    pub timestamp: bool,
    pub certificate_file_name: bool,
}

/// Export directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Extension of log message files
    pub log_extension: String,
    /// Marker contained in certificate file names
    pub certificate_marker: String,
}

/// Report output preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportSettings {
    /// Only print messages that have findings
    pub only_failures: bool,
}

impl Default for ValidatorSelection {
    fn default() -> Self {
        Self {
            signature: true,
            timestamp: true,
            certificate_file_name: true,
        }
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        let layout = ArchiveLayout::default();
        Self {
            log_extension: layout.log_extension,
            certificate_marker: layout.certificate_marker,
        }
    }
}

impl ValidatorConfiguration {
    /// Enabled validators in fixed order: certificate file names, signatures,
    /// then counters and times.
    #[must_use]
    pub fn build_validator(&self) -> AggregatedValidator {
        let mut validator = AggregatedValidator::new();
        if self.validators.certificate_file_name {
            let naming = KeySerialNaming::with_suffix(self.archive.certificate_marker.clone());
            validator.add(Box::new(CertificateFileNameValidator::new(Arc::new(naming))));
        }
        if self.validators.signature {
            validator.add(Box::new(SignatureValidator::new()));
        }
        if self.validators.timestamp {
            validator.add(Box::new(TimestampValidator::new()));
        }
        validator
    }

    #[must_use]
    pub fn archive_layout(&self) -> ArchiveLayout {
        ArchiveLayout {
            log_extension: self.archive.log_extension.clone(),
            certificate_marker: self.archive.certificate_marker.clone(),
        }
    }

    /// Check value constraints
    pub fn validate(&self) -> TseResult<()> {
        let extension = &self.archive.log_extension;
        if extension.is_empty() || extension.starts_with('.') || extension.contains('/') {
            return Err(TseError::ConfigurationError(format!(
                "Invalid log extension: '{extension}'"
            )));
        }
        if self.archive.certificate_marker.is_empty() {
            return Err(TseError::ConfigurationError(
                "Certificate marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> TseResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> TseResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("tse-log-validator").join("config.toml"))
        } else {
            Ok(PathBuf::from("tse-log-validator-config.toml"))
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> TseResult<ValidatorConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = ValidatorConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file, falling back to defaults without
    /// writing anything when the file does not exist
    pub fn load_or_default(&self) -> TseResult<ValidatorConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "No configuration at {}, using defaults",
                self.config_path.display()
            );
            Ok(ValidatorConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> TseResult<ValidatorConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            TseError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: ValidatorConfiguration = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &ValidatorConfiguration) -> TseResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TseError::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).map_err(|e| {
            TseError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        log::info!("Configuration saved successfully");
        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> TseResult<()> {
        let mut config = self.load_or_default()?;

        match key {
            "validators.signature" => config.validators.signature = parse_bool(value)?,
            "validators.timestamp" => config.validators.timestamp = parse_bool(value)?,
            "validators.certificate_file_name" => {
                config.validators.certificate_file_name = parse_bool(value)?;
            }
            "archive.log_extension" => config.archive.log_extension = value.to_string(),
            "archive.certificate_marker" => config.archive.certificate_marker = value.to_string(),
            "report.only_failures" => config.report.only_failures = parse_bool(value)?,
            _ => {
                return Err(TseError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        config.validate()?;
        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> TseResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => Ok(toml::to_string_pretty(&config)?),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| TseError::ConfigurationError(format!("JSON export failed: {e}"))),
            ExportFormat::Yaml => serde_yaml::to_string(&config)
                .map_err(|e| TseError::ConfigurationError(format!("YAML export failed: {e}"))),
        }
    }
}

/// Configuration export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Toml,
    Json,
    Yaml,
}

fn parse_bool(value: &str) -> TseResult<bool> {
    value
        .parse()
        .map_err(|_| TseError::ConfigurationError(format!("Invalid boolean value: {value}")))
}
