//! Resolution of the set of files handed to the scanners.
//!
//! `.gitignore`/`.ignore` files found anywhere under the source tree are merged
//! with a fixed block of built-in patterns, compiled into one gitwildmatch spec,
//! and the tree is walked for every file the spec does not exclude.

pub mod ignorespec;
pub mod walk;

pub use ignorespec::{ignorespec_lines, IgnoreSpec, ASH_INCLUSIONS, SOURCE_DIR_PLACEHOLDER};
pub use walk::{files_not_matching_spec, EXCLUDED_PATH_FRAGMENT};

use crate::error::{AshError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Cached ignore-spec lines, written to the output directory.
pub const IGNORE_REPORT_FILE: &str = "ash-ignore-report.txt";
/// Cached resolved file list, written to the output directory.
pub const SCAN_SET_FILE: &str = "ash-scan-set-files-list.txt";

/// Inputs for [`scan_set`].
#[derive(Debug, Clone)]
pub struct ScanSetOptions {
    pub source: PathBuf,
    /// Directory holding the two cache files. `None` disables caching.
    pub output: Option<PathBuf>,
    /// Extra ignore files, relative to `source`.
    pub ignorefiles: Vec<String>,
    /// Print every resolved path to stdout before filtering.
    pub print_results: bool,
    /// Keep only paths this pattern matches at the start of the string.
    pub filter_pattern: Option<Regex>,
}

impl ScanSetOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: None,
            ignorefiles: Vec::new(),
            print_results: false,
            filter_pattern: None,
        }
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn ignorefiles(mut self, ignorefiles: Vec<String>) -> Self {
        self.ignorefiles = ignorefiles;
        self
    }

    pub fn print_results(mut self, print_results: bool) -> Self {
        self.print_results = print_results;
        self
    }

    pub fn filter_pattern(mut self, filter_pattern: Regex) -> Self {
        self.filter_pattern = Some(filter_pattern);
        self
    }
}

/// Resolve the list of files to scan under `options.source`.
///
/// With an output directory, each cache file that already exists there is read
/// back instead of being recomputed. The cache is never checked for staleness;
/// delete the files to force a fresh resolution. Files that were computed are
/// written back. Paths are returned as resolved, without re-checking existence.
pub fn scan_set(options: &ScanSetOptions) -> Result<Vec<String>> {
    let source = std::path::absolute(&options.source)
        .map_err(|e| AshError::io(&options.source, e))?;

    let cache_paths = options
        .output
        .as_ref()
        .map(|output| (output.join(IGNORE_REPORT_FILE), output.join(SCAN_SET_FILE)));

    let mut ignore_lines = Vec::new();
    let mut file_list = Vec::new();
    let mut ignore_imported = false;
    let mut file_list_imported = false;

    if let Some((ignore_path, scan_set_path)) = &cache_paths {
        if ignore_path.exists() {
            ignore_lines = read_cache_lines(ignore_path)?;
            ignore_imported = true;
            tracing::debug!("Imported {} from cache", ignore_path.display());
        }
        if scan_set_path.exists() {
            file_list = read_cache_lines(scan_set_path)?;
            file_list_imported = true;
            tracing::debug!("Imported {} from cache", scan_set_path.display());
        }
    }

    if ignore_lines.is_empty() {
        ignore_lines = ignorespec_lines(&source, &options.ignorefiles)?;
    }

    if file_list.is_empty() {
        let spec = IgnoreSpec::compile(&source, &ignore_lines)?;
        file_list = files_not_matching_spec(&source, &spec)?;
    }

    if let Some((ignore_path, scan_set_path)) = &cache_paths {
        if !ignore_imported {
            tracing::debug!("Writing {} to {}", IGNORE_REPORT_FILE, display_parent(ignore_path));
            write_cache_lines(ignore_path, &ignore_lines)?;
        }
        if !file_list_imported {
            tracing::debug!("Writing {} to {}", SCAN_SET_FILE, display_parent(scan_set_path));
            write_cache_lines(scan_set_path, &file_list)?;
        }
    }

    if options.print_results {
        for file in &file_list {
            println!("{file}");
        }
    }

    if let Some(pattern) = &options.filter_pattern {
        file_list.retain(|file| matches_at_start(pattern, file));
    }

    Ok(file_list)
}

/// `true` when `pattern` matches `text` starting at its first character.
pub fn matches_at_start(pattern: &Regex, text: &str) -> bool {
    pattern.find(text).is_some_and(|m| m.start() == 0)
}

fn read_cache_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| AshError::io(path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

fn write_cache_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AshError::io(parent, e))?;
    }
    std::fs::write(path, lines.join("\n")).map_err(|e| AshError::io(path, e))
}

fn display_parent(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
