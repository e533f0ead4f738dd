use super::manager::PluginManager;
use super::registration::{PluginDescriptor, PluginType};

/// Catalog row for a plugin that ships with ASH.
pub(crate) struct BuiltinPlugin {
    pub name: &'static str,
    pub description: &'static str,
    pub tool: Option<&'static str>,
}

impl BuiltinPlugin {
    fn descriptor(&self, plugin_type: PluginType) -> PluginDescriptor {
        PluginDescriptor {
            name: self.name.to_string(),
            plugin_type,
            description: self.description.to_string(),
            tool: self.tool.map(str::to_string),
        }
    }
}

pub(crate) fn descriptors(plugin_type: PluginType, catalog: &[BuiltinPlugin]) -> Vec<PluginDescriptor> {
    catalog.iter().map(|plugin| plugin.descriptor(plugin_type)).collect()
}

/// Register every catalog entry under its own name from `module_path`.
pub(crate) fn register_catalog(
    manager: &mut PluginManager,
    plugin_type: PluginType,
    module_path: &str,
    catalog: &[BuiltinPlugin],
) {
    for descriptor in descriptors(plugin_type, catalog) {
        manager.register_plugin_module(
            plugin_type,
            &descriptor,
            module_path,
            Some(env!("CARGO_PKG_VERSION")),
            true,
        );
    }
}
