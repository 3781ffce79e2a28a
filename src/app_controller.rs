use anyhow::{Context, Result};
use log::{debug, error, info};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::csv_writer::{self, CodeRow};
use crate::eaf_document::AnnotationDocument;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::segment_coder::SegmentCoder;

// @module: Application controller for EAF coding

/// Outcome of a run over a set of input files
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files that were coded
    pub files_processed: usize,

    /// Files that could not be loaded, with the reason
    pub failures: Vec<(PathBuf, String)>,

    /// Rows written to the output file
    pub rows_written: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
            .context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load one EAF file and code its Mother and Toddler segments
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<CodeRow>, AppError> {
        let path = path.as_ref();
        info!("Processing {}", path.display());

        let tiers = &self.config.tiers;
        let document = AnnotationDocument::load(path, &tiers.required())
            .map_err(|e| AppError::document(path, e))?;
        debug!("All tiers: {:?}", document.tier_names().collect::<Vec<_>>());

        let coder = SegmentCoder::new(&document, tiers);
        let rows: Vec<CodeRow> = coder.code_document().iter().map(CodeRow::from).collect();
        debug!("{}: {} row(s)", coder.participant_id(), rows.len());
        Ok(rows)
    }

    /// Code every input and write the rows to the configured output file.
    ///
    /// A file that fails to load is logged and skipped; the remaining files
    /// are still processed and the output is written. Failures are reported
    /// in the returned summary.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();
        let files = FileManager::collect_eaf_files(inputs)?;

        let mut summary = RunSummary::default();
        let mut rows = Vec::new();
        for file in &files {
            match self.process_file(file) {
                Ok(file_rows) => {
                    rows.extend(file_rows);
                    summary.files_processed += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.failures.push((file.clone(), e.to_string()));
                }
            }
        }

        let output_path = Path::new(&self.config.output_path);
        summary.rows_written = csv_writer::write_csv(output_path, &rows, self.config.delimiter)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

        info!(
            "Wrote {} row(s) from {} file(s) to {} in {:.2?}",
            summary.rows_written,
            summary.files_processed,
            output_path.display(),
            start_time.elapsed()
        );
        if summary.has_failures() {
            error!("{} file(s) could not be processed", summary.failures.len());
        }

        Ok(summary)
    }
}
