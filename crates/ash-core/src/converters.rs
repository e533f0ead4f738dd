//! Built-in converters: turn non-scannable inputs into files the scanners understand.

use crate::plugins::builtin::{self, BuiltinPlugin};
use crate::plugins::{PluginDescriptor, PluginManager, PluginType};

pub const MODULE_PATH: &str = "automated_security_helper.converters.ash_default";

const CATALOG: &[BuiltinPlugin] = &[
    BuiltinPlugin {
        name: "archive",
        description: "Extracts zip, tar and tar.gz archives so their contents can be scanned",
        tool: None,
    },
    BuiltinPlugin {
        name: "jupyter",
        description: "Extracts code cells from Jupyter notebooks into Python sources",
        tool: None,
    },
];

pub fn builtin_plugins() -> Vec<PluginDescriptor> {
    builtin::descriptors(PluginType::Converter, CATALOG)
}

pub fn register(manager: &mut PluginManager) {
    builtin::register_catalog(manager, PluginType::Converter, MODULE_PATH, CATALOG);
}
