//! bctheme download - Package a theme as a zip archive

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::storage::FileSystem;
use crate::theme::zip_dir;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Theme to package
    pub theme: String,

    /// Archive path [default: ./<theme>.zip]
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &DownloadArgs) -> Result<()> {
    let _lock = ctx.lock()?;
    let dest = match &args.output {
        Some(path) => path.clone(),
        None => std::env::current_dir()?.join(format!("{}.zip", args.theme)),
    };

    let staging_root = ctx.packager().create_download_to_tmp(&args.theme)?;
    let staged = staging_root.join(&args.theme);
    let report = zip_dir(&staged, &dest, Some(&args.theme));
    ctx.fs.delete_tree(&staged)?;
    let report = report?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&report));
    }

    println!(
        "{} Packaged '{}' ({} files)",
        "✓".green().bold(),
        args.theme.cyan(),
        report.files
    );
    println!("  {}", report.path.display());
    println!("  {}", report.sha256.dimmed());
    Ok(())
}
