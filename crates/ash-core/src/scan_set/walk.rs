use super::ignorespec::{IgnoreSpec, SOURCE_DIR_PLACEHOLDER};
use crate::error::{AshError, Result};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Paths containing this fragment never enter the scan set.
pub const EXCLUDED_PATH_FRAGMENT: &str = "/node_modules/aws-cdk";

/// Walk everything under `path` and return the files `spec` does not ignore.
///
/// Directory symlinks are listed but not descended into, and never returned.
/// The result is sorted and free of duplicates.
pub fn files_not_matching_spec(path: &Path, spec: &IgnoreSpec) -> Result<Vec<String>> {
    let root_display = path.to_string_lossy().replace('\\', "/");
    let mut included = BTreeSet::new();

    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|source| AshError::Walk {
            path: path.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path_is_symlink() && entry.path().is_dir() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(path) else {
            continue;
        };
        if spec.is_ignored(relative, false) {
            continue;
        }

        let full = entry.path().to_string_lossy().to_string();
        if full.replace('\\', "/").contains(EXCLUDED_PATH_FRAGMENT) {
            continue;
        }

        tracing::debug!(
            "Matched file for scan set: {}",
            full.replacen(root_display.as_str(), SOURCE_DIR_PLACEHOLDER, 1)
        );
        included.insert(full);
    }

    Ok(included.into_iter().collect())
}
