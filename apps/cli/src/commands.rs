//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use talksite_core::loader::{audit_registry, list_series_files};
use talksite_core::normalize::series_link;
use talksite_core::{MergeConfig, ScaffoldConfig, merge_talks, scaffold_series};
use talksite_shared::{SiteConfig, init_config, load_config, load_config_from};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// talksite — merge talk series and scaffold their pages.
#[derive(Parser)]
#[command(
    name = "talksite",
    version,
    about = "Merge per-series talk files into talks.json and scaffold series pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Site root; config and relative paths resolve against it.
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Explicit config file (defaults to <root>/talksite.toml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Merge every series file into the aggregate talks.json.
    Merge {
        /// Directory holding the series files.
        #[arg(long)]
        data_dir: Option<String>,

        /// Aggregate file name inside the data directory.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Create one directory per series with a copy of the page template.
    Scaffold {
        /// Directory holding the series files.
        #[arg(long)]
        data_dir: Option<String>,

        /// Root directory for the generated series pages.
        #[arg(long)]
        series_dir: Option<String>,

        /// HTML template copied to every index.html.
        #[arg(long)]
        template: Option<String>,
    },

    /// Show the series registry and data files that have no mapping.
    Series,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default talksite.toml into the site root.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "talksite=info",
        1 => "talksite=debug",
        _ => "talksite=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let root = cli.root;
    let config_path = cli.config;

    if !root.is_dir() {
        return Err(eyre!("site root '{}' is not a directory", root.display()));
    }

    match cli.command {
        Command::Merge { data_dir, output } => {
            let mut config = load_site_config(&root, config_path.as_deref())?;
            apply_path_overrides(&mut config, data_dir, output, None, None)?;
            cmd_merge(&config, &root).await
        }
        Command::Scaffold {
            data_dir,
            series_dir,
            template,
        } => {
            let mut config = load_site_config(&root, config_path.as_deref())?;
            apply_path_overrides(&mut config, data_dir, None, series_dir, template)?;
            cmd_scaffold(&config, &root).await
        }
        Command::Series => {
            let config = load_site_config(&root, config_path.as_deref())?;
            cmd_series(&config, &root).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&root),
            ConfigAction::Show => {
                let config = load_site_config(&root, config_path.as_deref())?;
                cmd_config_show(&config)
            }
        },
    }
}

/// Load `--config` if given, else `<root>/talksite.toml`, else defaults.
fn load_site_config(root: &Path, explicit: Option<&Path>) -> Result<SiteConfig> {
    let config = match explicit {
        Some(path) => load_config_from(path)?,
        None => load_config(root)?,
    };
    Ok(config)
}

/// CLI flags win over config file values.
fn apply_path_overrides(
    config: &mut SiteConfig,
    data_dir: Option<String>,
    aggregate_file: Option<String>,
    series_dir: Option<String>,
    template: Option<String>,
) -> Result<()> {
    if let Some(dir) = data_dir {
        config.paths.data_dir = dir;
    }
    if let Some(name) = aggregate_file {
        config.paths.aggregate_file = name;
    }
    if let Some(dir) = series_dir {
        config.paths.series_dir = dir;
    }
    if let Some(path) = template {
        config.paths.template = path;
    }
    config.validate()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_merge(config: &SiteConfig, root: &Path) -> Result<()> {
    let paths = config.resolve(root);
    let merge_config = MergeConfig::new(config, &paths);

    if config.series.is_empty() {
        warn!("series registry is empty; every series file will be skipped");
    }
    info!(
        data_dir = %paths.data_dir.display(),
        series = config.series.len(),
        "merging talks"
    );

    let report = merge_talks(&merge_config).await?;

    println!();
    println!(
        "  Merged {} talks from {} files into {}",
        report.talk_count,
        report.files.len(),
        report.output_path.display()
    );
    println!("  Files processed: {}", report.files.join(", "));
    for skipped in &report.skipped {
        println!("  Skipped {}: {}", skipped.file_name, skipped.reason);
    }
    println!();

    Ok(())
}

async fn cmd_scaffold(config: &SiteConfig, root: &Path) -> Result<()> {
    let paths = config.resolve(root);
    let scaffold_config = ScaffoldConfig::new(config, &paths);

    let report = scaffold_series(&scaffold_config).await?;

    println!();
    for page in &report.pages {
        println!("  Created {}index.html", page.url);
    }
    println!();
    println!(
        "  Setup complete! Created {} series directories.",
        report.pages.len()
    );
    println!();
    println!("  Your URLs:");
    for page in &report.pages {
        println!("    {}", page.url);
    }
    println!();
    println!("  Tip: run this again whenever you add a new series file.");
    println!();

    Ok(())
}

async fn cmd_series(config: &SiteConfig, root: &Path) -> Result<()> {
    let paths = config.resolve(root);
    let files = list_series_files(&paths.data_dir, &paths.aggregate_file).await?;
    let audit = audit_registry(&files, &config.series);

    println!();
    println!("  Series ({} mapped):", audit.mapped.len());
    for (stem, slug) in &audit.mapped {
        println!("    {stem}.json -> {}", series_link(&config.paths.link_prefix, slug));
    }

    if !audit.unmapped.is_empty() {
        println!();
        println!("  No mapping (skipped by merge):");
        for stem in &audit.unmapped {
            println!("    {stem}.json");
        }
        println!("  Add them to the [series] table in talksite.toml.");
    }

    if !audit.orphaned.is_empty() {
        println!();
        println!("  Mapped but no data file:");
        for stem in &audit.orphaned {
            println!("    {stem}");
        }
    }
    println!();

    Ok(())
}

fn cmd_config_init(root: &Path) -> Result<()> {
    let path = init_config(root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &SiteConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
