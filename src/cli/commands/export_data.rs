//! bctheme export-data - Export the database as a default-data pattern

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::storage::FileSystem;
use crate::theme::zip_dir;

#[derive(Args, Debug)]
pub struct ExportDataArgs {
    /// Archive path [default: ./default.zip]
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Leave the exported CSV files in the staging directory
    #[arg(long)]
    pub keep_staging: bool,
}

pub fn run(ctx: &AppContext, args: &ExportDataArgs) -> Result<()> {
    let _lock = ctx.lock()?;
    let dest = match &args.output {
        Some(path) => path.clone(),
        None => std::env::current_dir()?.join("default.zip"),
    };

    let csv_root = ctx.packager().create_download_default_data_pattern_to_tmp()?;
    let report = zip_dir(&csv_root, &dest, None);
    if !args.keep_staging {
        ctx.fs.delete_tree(&csv_root)?;
    }
    let report = report?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&report));
    }

    println!(
        "{} Exported {} tables to {}",
        "✓".green().bold(),
        report.files,
        report.path.display().to_string().cyan()
    );
    if args.keep_staging {
        println!("  staged CSV files: {}", csv_root.display());
    }
    println!(
        "{}",
        "Values of sensitive site settings are left blank in the export.".dimmed()
    );
    Ok(())
}
