//! TSE log message validator CLI
//!
//! Decodes the log messages of extracted TSE exports, verifies their
//! signatures against the device certificates and checks counters, times and
//! certificate file names.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tse_log_validator::{
    config::{ConfigManager, ExportFormat, ValidatorConfiguration},
    LogMessageCodec, ValidateWorkflow,
};

#[derive(Parser)]
#[command(name = "tse-log-validator")]
#[command(about = "Validate log messages of TSE exports")]
#[command(long_about = "
TSE log validator - structural, signature and sequence checks for TSE exports

EXAMPLES:
    # Validate an extracted export directory
    tse-log-validator validate ./export

    # Validate several exports, listing only messages with findings
    tse-log-validator validate ./export-a ./export-b --only-failures

    # Show the decoded fields of one log message
    tse-log-validator inspect ./export/Unixt_1700000000_Sig-5_Log-Tra.log

    # Create the configuration file
    tse-log-validator config init

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more extracted export directories
    Validate {
        /// Export directories
        #[arg(value_name = "DIR", required = true)]
        dirs: Vec<PathBuf>,

        /// Configuration file (defaults to the user configuration)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Only list messages that have findings
        #[arg(long)]
        only_failures: bool,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormatArg,
    },

    /// Decode a single log message and print its fields
    Inspect {
        /// Log message file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
    },

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key, e.g. validators.timestamp
        key: String,
        /// Configuration value
        value: String,
    },

    /// Print the configuration file path
    Path,
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum ReportFormatArg {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let clean = match cli.command {
        Commands::Validate {
            dirs,
            config,
            only_failures,
            format,
        } => handle_validate_command(&dirs, config.as_deref(), only_failures, format)?,
        Commands::Inspect { file } => {
            handle_inspect_command(&file)?;
            true
        }
        Commands::Config(config_cmd) => {
            handle_config_command(config_cmd)?;
            true
        }
    };

    if !clean {
        std::process::exit(1);
    }
    Ok(())
}

fn load_configuration(path: Option<&Path>) -> Result<ValidatorConfiguration> {
    let manager = match path {
        Some(p) => ConfigManager::with_path(p),
        None => ConfigManager::new().into_diagnostic()?,
    };
    match path {
        Some(_) => manager.load().into_diagnostic(),
        None => manager.load_or_default().into_diagnostic(),
    }
}

/// Returns false if any archive has parse failures or findings.
fn handle_validate_command(
    dirs: &[PathBuf],
    config_path: Option<&Path>,
    only_failures: bool,
    format: ReportFormatArg,
) -> Result<bool> {
    let config = load_configuration(config_path)?;
    let only_failures = only_failures || config.report.only_failures;
    let workflow = ValidateWorkflow::from_config(&config);

    let mut clean = true;
    let mut summaries = Vec::new();
    for dir in dirs {
        let report = workflow
            .run_dir(dir)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to validate {}", dir.display()))?;
        clean &= report.is_clean();

        match format {
            ReportFormatArg::Text => {
                println!("{}", report.display(only_failures));
                if report.is_clean() {
                    println!("✅ {} passed all checks", dir.display());
                } else {
                    println!("❌ {} has defects", dir.display());
                }
                println!();
            }
            ReportFormatArg::Json => summaries.push(report.to_summary()),
        }
    }

    if format == ReportFormatArg::Json {
        let json = serde_json::to_string_pretty(&summaries).into_diagnostic()?;
        println!("{json}");
    }

    Ok(clean)
}

fn handle_inspect_command(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let message = LogMessageCodec::default()
        .decode(&bytes, &filename)
        .into_diagnostic()?;
    println!("{message}");
    Ok(())
}

fn handle_config_command(config_cmd: ConfigCommands) -> Result<()> {
    let config_manager = ConfigManager::new().into_diagnostic()?;

    match config_cmd {
        ConfigCommands::Show { format } => {
            if !config_manager.config_path().exists() {
                println!("📋 No configuration file found, showing defaults. Use 'config init' to create one.");
            }
            let content = config_manager
                .export_config(format.into())
                .into_diagnostic()?;
            println!("{content}");
        }

        ConfigCommands::Init => {
            let _config = config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "✅ Configuration initialized: {}",
                config_manager.config_path().display()
            );
            println!("   Edit the file to customize settings, or use 'config set' commands.");
        }

        ConfigCommands::Set { key, value } => {
            config_manager
                .update_value(&key, &value)
                .into_diagnostic()?;
            println!("✅ Configuration updated: {key} = {value}");
        }

        ConfigCommands::Path => {
            println!("{}", config_manager.config_path().display());
        }
    }

    Ok(())
}
