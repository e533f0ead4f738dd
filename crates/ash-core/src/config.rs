use crate::error::{AshError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config locations probed under the source directory, first hit wins.
pub const CONFIG_CANDIDATES: &[&str] = &[".ash/.ash.yaml", ".ash/.ash.yml", ".ash/ash.toml"];

/// Configuration loaded from `.ash/.ash.yaml` or `.ash/ash.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AshConfig {
    #[serde(default)]
    pub scan_set: ScanSetConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScanSetConfig {
    /// Ignore files to honor in addition to `.gitignore`/`.ignore`
    #[serde(default)]
    pub ignore_files: Vec<String>,

    /// Where the ignore report and file list are cached
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Only keep files whose path matches this regex from the start
    #[serde(default)]
    pub filter_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PluginsConfig {
    /// External plugin manifest (JSON)
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

impl AshConfig {
    /// Load a config file; YAML for `.yaml`/`.yml`, TOML otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AshError::io(path, e))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        let parsed = if is_yaml {
            serde_yaml::from_str::<Option<AshConfig>>(&content)
                .map(Option::unwrap_or_default)
                .map_err(|e| e.to_string())
        } else {
            toml::from_str::<AshConfig>(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| AshError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load the first config found under `source_dir`, or the defaults.
    pub fn discover(source_dir: &Path) -> Result<Self> {
        for candidate in CONFIG_CANDIDATES {
            let path = source_dir.join(candidate);
            if path.is_file() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Configured output directory, resolved against `source_dir`.
    pub fn output_dir(&self, source_dir: &Path) -> Option<PathBuf> {
        self.scan_set
            .output_dir
            .as_ref()
            .map(|dir| source_dir.join(dir))
    }

    /// Configured plugin manifest, resolved against `source_dir`.
    pub fn manifest_path(&self, source_dir: &Path) -> Option<PathBuf> {
        self.plugins
            .manifest
            .as_ref()
            .map(|path| source_dir.join(path))
    }
}
