use ash_core::plugins::{PluginDescriptor, PluginManager, PluginRegistration, PluginType};
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct ScanSetDocument<'a> {
    source: String,
    generated_at: chrono::DateTime<chrono::Utc>,
    file_count: usize,
    files: &'a [String],
}

#[derive(Serialize)]
struct PluginCategory<'a> {
    registrations: Vec<&'a PluginRegistration>,
    implementations: Vec<&'a PluginDescriptor>,
}

/// Print the resolved scan set as a JSON document on stdout.
pub fn print_scan_set_json(source: &Path, files: &[String]) -> anyhow::Result<()> {
    let document = ScanSetDocument {
        source: source.display().to_string(),
        generated_at: chrono::Utc::now(),
        file_count: files.len(),
        files,
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Print registrations and implementations for each category as JSON.
pub fn print_plugins_json(manager: &PluginManager, types: &[PluginType]) -> anyhow::Result<()> {
    let mut categories = BTreeMap::new();
    for plugin_type in types {
        categories.insert(
            plugin_type.plural(),
            PluginCategory {
                registrations: manager.library().get(*plugin_type).values().collect(),
                implementations: manager.plugin_modules(*plugin_type),
            },
        );
    }
    println!("{}", serde_json::to_string_pretty(&categories)?);
    Ok(())
}

/// Print the plugin registry to the terminal.
pub fn print_plugins(manager: &PluginManager, types: &[PluginType]) {
    println!();
    println!(
        "{}",
        format!(" ASH v{} — Plugin Registry", env!("CARGO_PKG_VERSION")).bold()
    );
    println!();

    for plugin_type in types {
        let registrations = manager.library().get(*plugin_type);
        let implementations = manager.plugin_modules(*plugin_type);

        println!(
            " {} ({} registered)",
            capitalize(plugin_type.plural()).bold().underline(),
            registrations.len()
        );

        for registration in registrations.values() {
            let status = if registration.enabled {
                "enabled".green().to_string()
            } else {
                "disabled".dimmed().to_string()
            };
            let implementation = implementations.iter().find(|d| d.name == registration.name);

            println!(
                " {} {} [{}] {}",
                "|-".dimmed(),
                registration.name.cyan(),
                status,
                registration.plugin_module_path.dimmed()
            );

            let detail = implementation
                .map(|d| d.description.as_str())
                .or(registration.description.as_deref());
            if let Some(detail) = detail {
                println!(" {}    {}", "|".dimmed(), detail);
            }
            if let Some(tool) = implementation.and_then(|d| d.tool.as_deref()) {
                println!(" {}    tool: {}", "|".dimmed(), tool.yellow());
            }
        }
        println!();
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
