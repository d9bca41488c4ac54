//! bctheme patterns - List a theme's default-data patterns

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::theme::PatternOptions;

#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Theme name
    pub theme: String,

    /// Label patterns with their bare name instead of "<title> ( <pattern> )"
    #[arg(long)]
    pub raw: bool,
}

pub fn run(ctx: &AppContext, args: &PatternsArgs) -> Result<()> {
    let options = PatternOptions { use_title: !args.raw };
    let patterns = ctx.packager().default_data_patterns(&args.theme, options)?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&patterns));
    }

    if patterns.is_empty() {
        println!("{}", format!("{} has no default data", args.theme).dimmed());
        return Ok(());
    }
    for (key, label) in &patterns {
        println!("{:32} {}", key.cyan(), label);
    }
    Ok(())
}
