// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use gornikeaf::app_config::{self, Config, OutputDelimiter};
use gornikeaf::Controller;

/// CLI Wrapper for OutputDelimiter to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDelimiter {
    Comma,
    Tab,
    Ascii,
}

impl From<CliDelimiter> for OutputDelimiter {
    fn from(cli_delimiter: CliDelimiter) -> Self {
        match cli_delimiter {
            CliDelimiter::Comma => OutputDelimiter::Comma,
            CliDelimiter::Tab => OutputDelimiter::Tab,
            CliDelimiter::Ascii => OutputDelimiter::Ascii,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for gornikeaf
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// gornikeaf - code parent-toddler EAF annotations into CSV
///
/// Reads the Mother and Toddler tiers of each EAF file and writes one CSV row
/// per segment with the codes found in their subtiers.
#[derive(Parser, Debug)]
#[command(name = "gornikeaf")]
#[command(version)]
#[command(about = "Generate a CSV summary of coded Mother/Toddler segments in EAF file(s)")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "Reads the Mother and Toddler tiers of each EAF file and writes one CSV row per segment.

EXAMPLES:
    gornikeaf P01.eaf P02.eaf                 # Write gornikeaf-output.csv
    gornikeaf -o codes.tsv -d tab P01.eaf     # Tab separated output
    gornikeaf -vv recordings/                 # Every .eaf under a directory, debug logging
    gornikeaf completions bash > gornikeaf.bash

COLUMNS:
    Participant ID, Speaker, Timestamp, Responsivity, Emotion Words,
    Type of Speech, Directed Speech, Time Period, Trash

EXIT STATUS:
    Non-zero if any input file could not be processed. All other files are
    still written to the output.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// EAF file(s) or directories containing them
    #[arg(value_name = "EAF_FILE")]
    eaf_files: Vec<PathBuf>,

    /// Write output to CSV_FILE [default: gornikeaf-output.csv]
    #[arg(short, long, value_name = "CSV_FILE")]
    output: Option<PathBuf>,

    /// CSV output field separator [default: comma]
    #[arg(short, long, value_enum)]
    delimiter: Option<CliDelimiter>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Set logging level
    #[arg(short, long, value_enum, conflicts_with = "verbose")]
    log_level: Option<CliLogLevel>,

    /// JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl CommandLineOptions {
    /// Build the effective configuration: config file first, flags on top
    fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(output) = &self.output {
            config.output_path = output.to_string_lossy().into_owned();
        }
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone().into();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone().into();
        } else if let Some(level) = app_config::LogLevel::from_verbosity(self.verbose) {
            config.log_level = level;
        }

        Ok(config)
    }
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // the effective level is raised or lowered later via log::set_max_level
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<ExitCode> {
    CustomLogger::init(app_config::LogLevel::default().to_level_filter())?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "gornikeaf", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.eaf_files.is_empty() {
        return Err(anyhow!("At least one EAF_FILE is required"));
    }

    let config = cli.to_config()?;
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Configuration: {:?}", config);

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&cli.eaf_files)?;

    if summary.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
