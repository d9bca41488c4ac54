//! bctheme init - Create the install root, default config and database

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::app::{AppContext, PROJECT_DIR};
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{BcError, Result};
use crate::storage::sqlite::NewSite;
use crate::storage::{Database, GlobalLock, SiteStore};
use crate::utils::ensure_dir;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Initialize in the user data directory instead of ./.bctheme
    #[arg(long)]
    pub global: bool,

    /// Rewrite config.toml with defaults even if it exists
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    root: PathBuf,
    config: PathBuf,
    config_written: bool,
    themes_root: PathBuf,
    database: PathBuf,
    schema_version: u32,
    site_created: bool,
}

/// Re-initialize the root an existing context points at.
pub fn run(ctx: &AppContext, args: &InitArgs) -> Result<()> {
    let report = initialize(&ctx.root, None, args)?;
    emit(ctx.output_format, &report)
}

/// Entry point used before an `AppContext` exists.
pub fn run_without_context(cli: &Cli, args: &InitArgs) -> Result<()> {
    let root = init_root(args)?;
    let report = initialize(&root, cli.config.as_deref(), args)?;
    emit(cli.output_format(), &report)
}

fn init_root(args: &InitArgs) -> Result<PathBuf> {
    if let Ok(root) = std::env::var("BC_ROOT") {
        return Ok(PathBuf::from(root));
    }
    if args.global {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| BcError::MissingConfig("data directory not found".to_string()))?;
        return Ok(data_dir.join("bctheme"));
    }
    Ok(std::env::current_dir()?.join(PROJECT_DIR))
}

fn initialize(root: &Path, explicit_config: Option<&Path>, args: &InitArgs) -> Result<InitReport> {
    ensure_dir(root)?;

    let config_path = root.join("config.toml");
    let config_written = args.force || !config_path.exists();
    if config_written {
        let raw = toml::to_string_pretty(&Config::default())
            .map_err(|err| BcError::Serialization(format!("serialize config: {err}")))?;
        std::fs::write(&config_path, raw)?;
    }

    let config = Config::load(explicit_config, root)?;
    let _lock = GlobalLock::acquire_timeout(root, Duration::from_millis(config.lock.timeout_ms))?;

    let paths = config.resolve_paths(root);
    ensure_dir(&paths.themes_root)?;
    ensure_dir(&paths.tmp_root)?;

    let db = Database::open(&paths.database)?;
    let site_created = if db.list_sites()?.is_empty() {
        db.insert_site(&NewSite {
            id: Some(1),
            name: "",
            title: &config.site.default_title,
            theme: &config.site.default_theme,
            status: true,
        })?;
        true
    } else {
        false
    };

    info!(root = %root.display(), site_created, "initialized");
    Ok(InitReport {
        root: root.to_path_buf(),
        config: config_path,
        config_written,
        themes_root: paths.themes_root,
        database: paths.database,
        schema_version: db.schema_version(),
        site_created,
    })
}

fn emit(format: OutputFormat, report: &InitReport) -> Result<()> {
    if format == OutputFormat::Json {
        return emit_json(&robot_ok(report));
    }

    println!("{} Initialized {}", "✓".green().bold(), report.root.display().to_string().cyan());
    if !report.config_written {
        println!("{}", "config.toml already exists, left unchanged (use --force to reset)".dimmed());
    }
    println!("  themes:   {}", report.themes_root.display());
    println!("  database: {} (schema v{})", report.database.display(), report.schema_version);
    if report.site_created {
        println!("  created default site 1");
    }
    Ok(())
}
