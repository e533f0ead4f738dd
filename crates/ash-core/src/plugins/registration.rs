use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name reserved for the built-in plugin package of each category.
pub const ASH_DEFAULT: &str = "ash-default";

/// Category of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Converter,
    Scanner,
    Reporter,
}

impl PluginType {
    pub const ALL: [PluginType; 3] = [
        PluginType::Converter,
        PluginType::Scanner,
        PluginType::Reporter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Converter => "converter",
            PluginType::Scanner => "scanner",
            PluginType::Reporter => "reporter",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            PluginType::Converter => "converters",
            PluginType::Scanner => "scanners",
            PluginType::Reporter => "reporters",
        }
    }

    /// The only module path allowed to register [`ASH_DEFAULT`] for this category.
    pub fn default_module_path(&self) -> &'static str {
        match self {
            PluginType::Converter => "automated_security_helper.converters.ash_default",
            PluginType::Scanner => "automated_security_helper.scanners.ash_default",
            PluginType::Reporter => "automated_security_helper.reporters.ash_default",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        for plugin_type in PluginType::ALL {
            if normalized == plugin_type.as_str() || normalized == plugin_type.plural() {
                return Ok(plugin_type);
            }
        }

        let suggestion = PluginType::ALL
            .iter()
            .map(|t| (t.as_str(), strsim::damerau_levenshtein(&normalized, t.as_str())))
            .filter(|(_, dist)| *dist <= 2)
            .min_by_key(|(_, dist)| *dist)
            .map(|(name, _)| name);

        match suggestion {
            Some(name) => Err(format!(
                "Unknown plugin type '{}', did you mean '{}'?",
                value, name
            )),
            None => Err(format!(
                "Unknown plugin type '{}' (expected converter, scanner or reporter)",
                value
            )),
        }
    }
}

/// One registered plugin package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRegistration {
    pub name: String,
    /// Logical module path the plugin was registered from,
    /// e.g. `automated_security_helper.scanners.ash_default`.
    pub plugin_module_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Registrations per category, keyed by plugin name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginLibrary {
    #[serde(default)]
    pub converters: BTreeMap<String, PluginRegistration>,
    #[serde(default)]
    pub scanners: BTreeMap<String, PluginRegistration>,
    #[serde(default)]
    pub reporters: BTreeMap<String, PluginRegistration>,
}

impl PluginLibrary {
    /// Library holding only the built-in `ash-default` package of every category.
    pub fn with_defaults() -> Self {
        let mut library = PluginLibrary::default();
        for plugin_type in PluginType::ALL {
            library.get_mut(plugin_type).insert(
                ASH_DEFAULT.to_string(),
                PluginRegistration {
                    name: ASH_DEFAULT.to_string(),
                    plugin_module_path: plugin_type.default_module_path().to_string(),
                    description: Some(format!(
                        "The default set of {} for ASH",
                        plugin_type.plural()
                    )),
                    version: Some(env!("CARGO_PKG_VERSION").to_string()),
                    author: Some("Automated Security Helper maintainers".to_string()),
                    enabled: true,
                },
            );
        }
        library
    }

    pub fn get(&self, plugin_type: PluginType) -> &BTreeMap<String, PluginRegistration> {
        match plugin_type {
            PluginType::Converter => &self.converters,
            PluginType::Scanner => &self.scanners,
            PluginType::Reporter => &self.reporters,
        }
    }

    pub fn get_mut(
        &mut self,
        plugin_type: PluginType,
    ) -> &mut BTreeMap<String, PluginRegistration> {
        match plugin_type {
            PluginType::Converter => &mut self.converters,
            PluginType::Scanner => &mut self.scanners,
            PluginType::Reporter => &mut self.reporters,
        }
    }

    pub fn len(&self) -> usize {
        self.converters.len() + self.scanners.len() + self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A concrete converter, scanner or reporter implementation.
///
/// Scanners name the external `tool` they invoke as a subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub plugin_type: PluginType,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

/// What a registration is derived from: a concrete implementation or a bare name.
#[derive(Debug, Clone, Copy)]
pub enum PluginRef<'a> {
    Name(&'a str),
    Plugin(&'a PluginDescriptor),
}

impl PluginRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            PluginRef::Name(name) => name,
            PluginRef::Plugin(descriptor) => &descriptor.name,
        }
    }
}

impl<'a> From<&'a str> for PluginRef<'a> {
    fn from(name: &'a str) -> Self {
        PluginRef::Name(name)
    }
}

impl<'a> From<&'a String> for PluginRef<'a> {
    fn from(name: &'a String) -> Self {
        PluginRef::Name(name.as_str())
    }
}

impl<'a> From<&'a PluginDescriptor> for PluginRef<'a> {
    fn from(descriptor: &'a PluginDescriptor) -> Self {
        PluginRef::Plugin(descriptor)
    }
}
