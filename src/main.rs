//! janitor - Finds and removes cruft left behind by package management.
//!
//! Usage:
//!   janitor plugins              List loaded plugins
//!   janitor list                 Show cruft found by unconditional plugins
//!   janitor list -c PostCleanup  Show cruft for a condition
//!   janitor clean --all          Clean everything found
//!   janitor clean NAME...        Clean selected items
//!   janitor --help               Show help

mod config;
mod system;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use janitor_core::Application;
use janitor_ops::{CleanupCycle, CruftInfo, CycleOptions, CycleReport, Selection};
use janitor_plugin::{Condition, ConditionQuery, MatchMode, PluginManager};
use janitor_plugins::builtin_registry;

use crate::config::JanitorConfig;
use crate::system::SystemApplication;

#[derive(Parser)]
#[command(
    name = "janitor",
    version,
    about = "Finds and removes cruft left behind by package management",
    long_about = "janitor runs cruft-detecting plugins against the installed system.\n\n\
                  Plugins are declared in *_plugin.toml files inside the plugin \
                  directories and are selected by condition tags."
)]
struct Cli {
    /// Configuration file (defaults to the per-user config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Plugin directory, replacing the configured ones (repeatable)
    #[arg(short = 'p', long = "plugin-dir", global = true)]
    plugin_dirs: Vec<PathBuf>,

    /// dpkg status database to read
    #[arg(long, global = true)]
    status_file: Option<PathBuf>,

    /// Match condition tags as substrings of plugin conditions
    #[arg(long, global = true)]
    substring_conditions: bool,

    /// Skip broken plugin sources instead of failing
    #[arg(long, global = true)]
    skip_broken: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Query {
    /// Condition tag to select plugins by ("*" selects every plugin)
    #[arg(short, long)]
    condition: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// List loaded plugins
    Plugins {
        #[command(flatten)]
        query: Query,
    },

    /// Show the cruft found by the selected plugins
    List {
        #[command(flatten)]
        query: Query,
    },

    /// Clean cruft found by the selected plugins
    Clean {
        #[command(flatten)]
        query: Query,

        /// Full names of the items to clean (as shown by `list`)
        names: Vec<String>,

        /// Clean every item found
        #[arg(short, long, conflicts_with = "names")]
        all: bool,

        /// Report what would be cleaned without changing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Keep cleaning after an item fails
        #[arg(short, long)]
        keep_going: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Command-line flags override the configuration file.
    fn apply(&self, config: &mut JanitorConfig) {
        if !self.plugin_dirs.is_empty() {
            config.plugins.plugin_dirs = self.plugin_dirs.clone();
        }
        if let Some(status_file) = &self.status_file {
            config.dpkg_status_file = status_file.clone();
        }
        if self.substring_conditions {
            config.plugins.match_mode = MatchMode::Substring;
        }
        if self.skip_broken {
            config.plugins.fail_fast = false;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = JanitorConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let app: Arc<dyn Application> = Arc::new(
        SystemApplication::open(&config.dpkg_status_file, &config.extended_states_file)
            .wrap_err("Failed to read package status")?,
    );
    let registry = builtin_registry(&config.builtin_options())?;
    let mut manager = PluginManager::with_config(app, registry, config.plugins.clone());

    match cli.command {
        Command::Plugins { query } => run_plugins(&mut manager, &query)?,
        Command::List { query } => run_list(&mut manager, &query)?,
        Command::Clean {
            query,
            names,
            all,
            dry_run,
            keep_going,
        } => {
            let selection = if all {
                Selection::All
            } else if names.is_empty() {
                bail!("Nothing selected: pass --all or the names of items to clean");
            } else {
                Selection::names(names)
            };
            let options = CycleOptions {
                dry_run,
                continue_on_error: keep_going || config.continue_on_error,
            };
            run_clean(&mut manager, &query, &selection, options)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn condition_query(query: &Query) -> ConditionQuery {
    ConditionQuery::from(query.condition.clone())
}

fn report_skipped(manager: &PluginManager) {
    for path in manager.skipped_files() {
        eprintln!("warning: skipped broken plugin source {}", path.display());
    }
}

#[derive(Serialize)]
struct PluginInfo {
    name: String,
    condition: Condition,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// List the plugins a query selects.
fn run_plugins(manager: &mut PluginManager, query: &Query) -> Result<()> {
    let mut on_load = |path: &Path, index: usize, total: usize| {
        tracing::info!("loading plugin source {}/{}: {}", index + 1, total, path.display());
    };
    let plugins = manager
        .get_plugins_with_callback(condition_query(query), &mut on_load)
        .context("Failed to load plugins")?;
    report_skipped(manager);

    let infos: Vec<PluginInfo> = plugins
        .iter()
        .map(|plugin| PluginInfo {
            name: plugin.name().to_string(),
            condition: plugin.condition(),
            description: plugin.description(),
        })
        .collect();

    match query.format {
        OutputFormat::Text => {
            if infos.is_empty() {
                println!("No plugins selected.");
            }
            for info in &infos {
                println!("{:<20} {}", info.name, info.condition);
                if let Some(description) = &info.description {
                    println!("    {}", description);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
    }

    Ok(())
}

/// Show what the selected plugins find.
fn run_list(manager: &mut PluginManager, query: &Query) -> Result<()> {
    let cycle =
        CleanupCycle::scan(manager, condition_query(query)).context("Failed to scan for cruft")?;
    report_skipped(manager);

    let found: Vec<CruftInfo> = cycle.found().iter().map(CruftInfo::from).collect();

    match query.format {
        OutputFormat::Text => {
            if found.is_empty() {
                println!("No cruft found.");
                return Ok(());
            }
            for info in &found {
                match info.disk_usage {
                    Some(size) => println!("{} ({})", info.name, format_size(size)),
                    None => println!("{}", info.name),
                }
                for line in info.description.lines().filter(|l| !l.is_empty()) {
                    println!("    {}", line);
                }
            }
            let total: u64 = found.iter().filter_map(|info| info.disk_usage).sum();
            println!();
            println!("{} items, {} reclaimable", found.len(), format_size(total));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
    }

    Ok(())
}

/// Clean the selected items and run post-cleanup steps.
fn run_clean(
    manager: &mut PluginManager,
    query: &Query,
    selection: &Selection,
    options: CycleOptions,
) -> Result<()> {
    let mut cycle = CleanupCycle::scan_with_options(manager, condition_query(query), options)
        .context("Failed to scan for cruft")?;
    report_skipped(manager);

    let report = cycle.cleanup(selection);

    match query.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.is_success() {
        bail!("Cleanup finished with errors");
    }
    Ok(())
}

fn print_report(report: &CycleReport) {
    for name in &report.unmatched {
        eprintln!("warning: nothing named {} was found", name);
    }
    for name in &report.cleaned {
        println!("  {}", name);
    }
    for failure in report.failures.iter().chain(&report.post_cleanup_failures) {
        eprintln!("error: {}", failure);
    }
    println!(
        "{} ({} freed)",
        report.summary(),
        format_size(report.bytes_freed)
    );
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
