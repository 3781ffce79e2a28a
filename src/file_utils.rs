use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of ELAN annotation files
pub const EAF_EXTENSION: &str = "eaf";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @checks: Extension matches, ignoring case
    pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, extension) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Expand command line inputs into the list of EAF files to process.
    ///
    /// Directories are searched recursively for `.eaf` files. Anything else is
    /// passed through unchanged so that the loader reports it against its name.
    pub fn collect_eaf_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(inputs.len());
        for input in inputs {
            if Self::dir_exists(input) {
                let found = Self::find_files(input, EAF_EXTENSION)?;
                if found.is_empty() {
                    warn!("No .{} files found in directory: {}", EAF_EXTENSION, input.display());
                }
                debug!("Found {} EAF file(s) in {}", found.len(), input.display());
                files.extend(found);
            } else {
                files.push(input.clone());
            }
        }
        Ok(files)
    }

    /// Participant ID for an input file: its name without the `.eaf` extension
    pub fn participant_id<P: AsRef<Path>>(path: P) -> String {
        let path = path.as_ref();
        let name = if Self::has_extension(path, EAF_EXTENSION) {
            path.file_stem()
        } else {
            path.file_name()
        };
        name.map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
