use crate::error::{AshError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Patterns appended after every discovered ignore file.
///
/// `.template.json` files are re-included under CDK asset directories because
/// they are the synthesized CloudFormation templates.
pub const ASH_INCLUSIONS: &[&str] = &[".git", "**/cdk.out/asset.*", "!**/*.template.json"];

/// Replaces the scan root in marker lines so the report is portable.
pub const SOURCE_DIR_PLACEHOLDER: &str = "${SOURCE_DIR}";

const INCLUSIONS_LABEL: &str = "ASH_INCLUSIONS";

const IGNORE_FILE_NAMES: &[&str] = &[".ignore", ".gitignore"];

fn start_marker(label: &str) -> String {
    format!("######### START CONTENTS: {label} #########")
}

fn end_marker(label: &str) -> String {
    format!("######### END CONTENTS: {label} #########")
}

/// Collect the combined ignore-spec lines for the tree under `path`.
///
/// Every `.ignore` and `.gitignore` at or below `path`, plus each extra
/// `ignorefiles` entry (relative to `path`), contributes one delimited block.
/// Discovery does not descend into directory symlinks, and a physical file
/// reached under two spellings contributes once. Candidates are de-duplicated
/// through a hash map, so the relative order of the file blocks is unspecified
/// and may differ between runs. The built-in [`ASH_INCLUSIONS`] block always
/// comes last so it overrides user patterns.
pub fn ignorespec_lines(path: &Path, ignorefiles: &[String]) -> Result<Vec<String>> {
    let root = path.to_string_lossy().replace('\\', "/");
    let root = root.trim_end_matches('/');

    let discovered = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| IGNORE_FILE_NAMES.contains(&name))
        })
        .map(|entry| entry.into_path());
    let extra = ignorefiles.iter().map(|file| path.join(file));

    // Physical file -> first spelling seen, used for the block label.
    let mut candidates: HashMap<PathBuf, PathBuf> = HashMap::new();
    for candidate in discovered.chain(extra) {
        if !candidate.is_file() {
            continue;
        }
        let Ok(physical) = std::fs::canonicalize(&candidate) else {
            continue;
        };
        candidates.entry(physical).or_insert(candidate);
    }

    let mut lines = Vec::new();
    for ignorefile in candidates.values() {
        let label = portable_label(root, ignorefile);
        tracing::debug!("Found .ignore file: {}", label);

        let content =
            std::fs::read_to_string(ignorefile).map_err(|e| AshError::io(ignorefile, e))?;
        lines.push(start_marker(&label));
        lines.extend(content.lines().map(str::to_string));
        lines.push(end_marker(&label));
        lines.push(String::new());
    }

    let mut lines: Vec<String> = lines.iter().map(|line| line.trim().to_string()).collect();
    lines.push(start_marker(INCLUSIONS_LABEL));
    lines.extend(ASH_INCLUSIONS.iter().map(|pattern| pattern.to_string()));
    lines.push(end_marker(INCLUSIONS_LABEL));
    Ok(lines)
}

fn portable_label(root: &str, ignorefile: &Path) -> String {
    let file = ignorefile.to_string_lossy().replace('\\', "/");
    match file.strip_prefix(root) {
        Some(rest) => format!("{SOURCE_DIR_PLACEHOLDER}{rest}"),
        None => file,
    }
}

/// Compiled gitwildmatch matcher for the combined ignore-spec lines.
///
/// All blocks are flattened into one spec evaluated relative to the scan root.
/// Each pattern line keeps its position, so the last line matching a path or
/// any of its ancestor directories decides whether the path is excluded.
#[derive(Debug, Clone)]
pub struct IgnoreSpec {
    patterns: Vec<Gitignore>,
}

impl IgnoreSpec {
    /// Compile `lines` into matchers rooted at `root`.
    ///
    /// Blank and `#` lines are skipped and a leading `!` negates.
    pub fn compile(root: &Path, lines: &[String]) -> Result<Self> {
        tracing::debug!("Generating spec from collected ignorespec lines");
        let mut patterns = Vec::new();
        for line in lines {
            let mut builder = GitignoreBuilder::new(root);
            builder.add_line(None, line)?;
            let matcher = builder.build()?;
            if matcher.num_ignores() + matcher.num_whitelists() == 0 {
                continue;
            }
            patterns.push(matcher);
        }
        Ok(Self { patterns })
    }

    /// Whether `relative_path` is excluded.
    ///
    /// A pattern matches when it matches the path itself or one of its parent
    /// directories. Among matching patterns the latest one wins, so a negation
    /// can re-include a file beneath an excluded directory and a later
    /// exclusion overrides an earlier negation.
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.has_root() || relative_path.as_os_str().is_empty() {
            return false;
        }
        self.patterns
            .iter()
            .rev()
            .map(|pattern| pattern.matched_path_or_any_parents(relative_path, is_dir))
            .find(|matched| !matched.is_none())
            .is_some_and(|matched| matched.is_ignore())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
