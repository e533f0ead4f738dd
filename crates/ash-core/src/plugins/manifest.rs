use super::manager::PluginManager;
use super::registration::{PluginDescriptor, PluginType};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable naming an external plugin manifest.
pub const MANIFEST_ENV_VAR: &str = "ASH_PLUGIN_MANIFEST";

/// Manifest format for third-party plugins.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginManifest {
    #[serde(default)]
    pub converters: Vec<ExternalPlugin>,
    #[serde(default)]
    pub scanners: Vec<ExternalPlugin>,
    #[serde(default)]
    pub reporters: Vec<ExternalPlugin>,
}

/// One third-party plugin entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalPlugin {
    pub name: String,
    pub module_path: String,
    #[serde(default)]
    pub description: String,
    /// External executable the plugin wraps, if any.
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl PluginManifest {
    pub fn entries(&self, plugin_type: PluginType) -> &[ExternalPlugin] {
        match plugin_type {
            PluginType::Converter => &self.converters,
            PluginType::Scanner => &self.scanners,
            PluginType::Reporter => &self.reporters,
        }
    }
}

/// Read the manifest named by `ASH_PLUGIN_MANIFEST`, if the variable is set and non-blank.
pub fn load_manifest_from_env() -> anyhow::Result<Option<PluginManifest>> {
    std::env::var_os(MANIFEST_ENV_VAR)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
        .map(|path| load_manifest_from_path(&path))
        .transpose()
}

/// Parse the JSON plugin manifest at `path`.
pub fn load_manifest_from_path(path: &Path) -> anyhow::Result<PluginManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read ASH plugin manifest {}", path.display()))?;
    let manifest: PluginManifest = serde_json::from_str(&content)
        .with_context(|| format!("ASH plugin manifest {} is not valid JSON", path.display()))?;
    tracing::debug!("Loaded plugin manifest {}", path.display());
    Ok(manifest)
}

/// Register every manifest entry with `manager`.
///
/// Entries go through the normal registration rules, so a manifest cannot take
/// over `ash-default` or shadow an existing plugin. Returns how many were accepted.
pub fn register_manifest(manager: &mut PluginManager, manifest: &PluginManifest) -> usize {
    let before = manager.library().len();

    for plugin_type in PluginType::ALL {
        for entry in manifest.entries(plugin_type) {
            let descriptor = PluginDescriptor {
                name: entry.name.clone(),
                plugin_type,
                description: entry.description.clone(),
                tool: entry.tool.clone(),
            };
            manager.register_plugin_module(
                plugin_type,
                &descriptor,
                &entry.module_path,
                entry.version.as_deref(),
                entry.enabled,
            );
        }
    }

    manager.library().len() - before
}

fn example_plugin(name: &str, category: PluginType, tool: Option<&str>) -> ExternalPlugin {
    ExternalPlugin {
        name: name.to_string(),
        module_path: format!("my_org.ash_plugins.{}", category.plural()),
        description: format!("Example third-party {category}; set enabled to true once installed"),
        tool: tool.map(str::to_string),
        version: Some("0.1.0".to_string()),
        enabled: false,
    }
}

/// Write a disabled example manifest to `path`. An existing file is left untouched.
pub fn scaffold_manifest(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {}", parent.display()))?;
    }

    let template = PluginManifest {
        converters: Vec::new(),
        scanners: vec![example_plugin("example-scanner", PluginType::Scanner, Some("example-tool"))],
        reporters: vec![example_plugin("example-reporter", PluginType::Reporter, None)],
    };
    let body = serde_json::to_string_pretty(&template)?;

    match std::fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => file
            .write_all(body.as_bytes())
            .with_context(|| format!("Cannot write ASH plugin manifest {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::debug!("Plugin manifest {} already exists", path.display());
            Ok(())
        }
        Err(err) => Err::<(), _>(err)
            .with_context(|| format!("Cannot create ASH plugin manifest {}", path.display())),
    }
}
