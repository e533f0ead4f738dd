use crate::plugins::builtin::{self, BuiltinPlugin};
use crate::plugins::{PluginDescriptor, PluginManager, PluginType};

pub const MODULE_PATH: &str = "automated_security_helper.reporters.ash_default";

const CATALOG: &[BuiltinPlugin] = &[
    BuiltinPlugin {
        name: "csv",
        description: "Findings as CSV rows",
        tool: None,
    },
    BuiltinPlugin {
        name: "cyclonedx",
        description: "CycloneDX SBOM",
        tool: None,
    },
    BuiltinPlugin {
        name: "flat-json",
        description: "Flattened findings as JSON",
        tool: None,
    },
    BuiltinPlugin {
        name: "gitlab-sast",
        description: "GitLab SAST report format",
        tool: None,
    },
    BuiltinPlugin {
        name: "html",
        description: "Standalone HTML report",
        tool: None,
    },
    BuiltinPlugin {
        name: "junitxml",
        description: "JUnit XML for CI test dashboards",
        tool: None,
    },
    BuiltinPlugin {
        name: "markdown",
        description: "Markdown summary",
        tool: None,
    },
    BuiltinPlugin {
        name: "ocsf",
        description: "Open Cybersecurity Schema Framework findings",
        tool: None,
    },
    BuiltinPlugin {
        name: "sarif",
        description: "Aggregated SARIF 2.1.0 log",
        tool: None,
    },
    BuiltinPlugin {
        name: "spdx",
        description: "SPDX SBOM",
        tool: None,
    },
    BuiltinPlugin {
        name: "text",
        description: "Plain-text summary",
        tool: None,
    },
];

pub fn builtin_plugins() -> Vec<PluginDescriptor> {
    builtin::descriptors(PluginType::Reporter, CATALOG)
}

pub fn register(manager: &mut PluginManager) {
    builtin::register_catalog(manager, PluginType::Reporter, MODULE_PATH, CATALOG);
}
