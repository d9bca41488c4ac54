//! bctheme copy - Duplicate a theme under a new name

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Theme to copy; the copy is named `<theme><copy_suffix>`
    pub theme: String,
}

pub fn run(ctx: &AppContext, args: &CopyArgs) -> Result<()> {
    let _lock = ctx.lock()?;
    let theme = ctx.packager().copy(&args.theme)?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&theme));
    }

    println!(
        "{} Copied '{}' to '{}'",
        "✓".green().bold(),
        args.theme,
        theme.name.cyan()
    );
    println!("{}", theme.path.display().to_string().dimmed());
    Ok(())
}
