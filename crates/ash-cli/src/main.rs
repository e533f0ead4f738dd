mod display;

use anyhow::{Context, Result};
use ash_core::plugins::events::{ExecutionComplete, ExecutionStart};
use ash_core::plugins::manifest;
use ash_core::plugins::{PluginManager, PluginType};
use ash_core::{AshConfig, ScanSetOptions};
use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "ash",
    version,
    about = "ASH — Automated Security Helper",
    long_about = "Resolve the files eligible for security scanning and inspect the converter, scanner and reporter plugin registry."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (defaults to .ash/.ash.yaml or .ash/ash.toml under the source directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get the list of files not matching .gitignore underneath the source path
    ScanSet {
        /// Path to scan (defaults to the current directory)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Directory to save ash-ignore-report.txt and ash-scan-set-files-list.txt to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only keep files whose path matches this regular expression from the start
        #[arg(long)]
        filter_pattern: Option<String>,

        /// Ignore file to use in addition to the standard gitignore (repeatable)
        #[arg(long)]
        ignorefile: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Inspect registered plugins
    Plugins {
        #[command(subcommand)]
        command: PluginCommands,
    },
}

#[derive(Subcommand)]
enum PluginCommands {
    /// List plugin registrations and implementations
    List {
        /// Only show one category (converter, scanner, reporter)
        #[arg(long = "type")]
        plugin_type: Option<PluginType>,

        /// External plugin manifest to register before listing
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Source directory used to discover the config file
        #[arg(long)]
        source: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write an example external plugin manifest
    InitManifest {
        /// Where to write the manifest
        #[arg(default_value = "ash-plugins.json")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::ScanSet {
            source,
            output,
            filter_pattern,
            ignorefile,
            format,
        } => cmd_scan_set(
            source,
            output,
            filter_pattern,
            ignorefile,
            cli.config.as_deref(),
            &format,
        ),
        Commands::Plugins { command } => match command {
            PluginCommands::List {
                plugin_type,
                manifest,
                source,
                format,
            } => cmd_plugins_list(plugin_type, manifest, source, cli.config.as_deref(), &format),
            PluginCommands::InitManifest { path } => cmd_init_manifest(&path),
        },
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_source(source: Option<PathBuf>) -> Result<PathBuf> {
    match source {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

fn load_config(explicit: Option<&Path>, source: &Path) -> Result<AshConfig> {
    let config = match explicit {
        Some(path) => AshConfig::load(path)?,
        None => AshConfig::discover(source)?,
    };
    Ok(config)
}

fn cmd_scan_set(
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    filter_pattern: Option<String>,
    ignorefile: Vec<String>,
    config_path: Option<&Path>,
    format: &str,
) -> Result<()> {
    let source = resolve_source(source)?;
    let config = load_config(config_path, &source)?;

    let output = output.or_else(|| config.output_dir(&source));
    let ignorefiles = if ignorefile.is_empty() {
        config.scan_set.ignore_files.clone()
    } else {
        ignorefile
    };
    let filter = filter_pattern
        .or_else(|| config.scan_set.filter_pattern.clone())
        .map(|pattern| {
            Regex::new(&pattern).with_context(|| format!("Invalid filter pattern '{}'", pattern))
        })
        .transpose()?;

    let json = format == "json";
    let mut options = ScanSetOptions::new(&source)
        .ignorefiles(ignorefiles)
        .print_results(!json);
    options.output = output.clone();
    options.filter_pattern = filter;

    let mut manager = PluginManager::with_builtin_plugins();
    manager.subscribe(|event: &ExecutionStart| {
        tracing::debug!(
            "Resolving scan set for {} at {}",
            event.source_dir.display(),
            event.started_at
        );
        Ok(())
    });
    manager.subscribe(|event: &ExecutionComplete| {
        tracing::debug!(
            "Scan set for {} resolved to {} files",
            event.source_dir.display(),
            event.scan_set_size
        );
        Ok(())
    });

    manager.notify(&ExecutionStart::new(source.clone(), output))?;
    let files = ash_core::scan_set(&options)
        .with_context(|| format!("Failed to resolve scan set for '{}'", source.display()))?;
    manager.notify(&ExecutionComplete::new(source.clone(), files.len()))?;

    if json {
        display::print_scan_set_json(&source, &files)?;
    } else {
        // The resolved list goes to stderr; stdout already carries one path per line.
        eprintln!("{:?}", files);
    }

    Ok(())
}

fn cmd_plugins_list(
    plugin_type: Option<PluginType>,
    manifest_path: Option<PathBuf>,
    source: Option<PathBuf>,
    config_path: Option<&Path>,
    format: &str,
) -> Result<()> {
    let source = resolve_source(source)?;
    let config = load_config(config_path, &source)?;

    let mut manager = PluginManager::with_builtin_plugins();

    let manifest = match manifest_path.or_else(|| config.manifest_path(&source)) {
        Some(path) => Some(manifest::load_manifest_from_path(&path)?),
        None => manifest::load_manifest_from_env()?,
    };
    if let Some(manifest) = manifest {
        let accepted = manifest::register_manifest(&mut manager, &manifest);
        tracing::debug!("Registered {} plugins from manifest", accepted);
    }

    let types: Vec<PluginType> = match plugin_type {
        Some(t) => vec![t],
        None => PluginType::ALL.to_vec(),
    };

    match format {
        "json" => display::print_plugins_json(&manager, &types)?,
        _ => display::print_plugins(&manager, &types),
    }
    Ok(())
}

fn cmd_init_manifest(path: &Path) -> Result<()> {
    let existed = path.exists();
    manifest::scaffold_manifest(path)?;
    if existed {
        println!("Plugin manifest already exists at {}", path.display());
    } else {
        println!("Plugin manifest written to {}", path.display());
    }
    Ok(())
}
