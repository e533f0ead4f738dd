//! Built-in scanners. Each wraps a third-party tool that is invoked as a subprocess.

use crate::plugins::builtin::{self, BuiltinPlugin};
use crate::plugins::{PluginDescriptor, PluginManager, PluginType};

pub const MODULE_PATH: &str = "automated_security_helper.scanners.ash_default";

const CATALOG: &[BuiltinPlugin] = &[
    BuiltinPlugin {
        name: "bandit",
        description: "Python SAST",
        tool: Some("bandit"),
    },
    BuiltinPlugin {
        name: "cdk-nag",
        description: "AWS CDK / CloudFormation rule packs",
        tool: Some("cdk"),
    },
    BuiltinPlugin {
        name: "cfn-nag",
        description: "CloudFormation template linting",
        tool: Some("cfn_nag_scan"),
    },
    BuiltinPlugin {
        name: "checkov",
        description: "Infrastructure-as-code misconfiguration scanning",
        tool: Some("checkov"),
    },
    BuiltinPlugin {
        name: "detect-secrets",
        description: "Hardcoded secret detection",
        tool: Some("detect-secrets"),
    },
    BuiltinPlugin {
        name: "grype",
        description: "Dependency vulnerability scanning",
        tool: Some("grype"),
    },
    BuiltinPlugin {
        name: "npm-audit",
        description: "JavaScript dependency audit",
        tool: Some("npm"),
    },
    BuiltinPlugin {
        name: "opengrep",
        description: "Multi-language SAST (semgrep-compatible rules)",
        tool: Some("opengrep"),
    },
    BuiltinPlugin {
        name: "semgrep",
        description: "Multi-language SAST",
        tool: Some("semgrep"),
    },
    BuiltinPlugin {
        name: "syft",
        description: "Software bill of materials generation",
        tool: Some("syft"),
    },
];

pub fn builtin_plugins() -> Vec<PluginDescriptor> {
    builtin::descriptors(PluginType::Scanner, CATALOG)
}

pub fn register(manager: &mut PluginManager) {
    builtin::register_catalog(manager, PluginType::Scanner, MODULE_PATH, CATALOG);
}
