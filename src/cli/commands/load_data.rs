//! bctheme load-data - Load a default-data pattern into the database

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct LoadDataArgs {
    /// Pattern key, `<theme>.<pattern>` (see `bctheme patterns`)
    pub pattern: String,
}

pub fn run(ctx: &AppContext, args: &LoadDataArgs) -> Result<()> {
    let _lock = ctx.lock()?;
    let report = ctx.loader().load(&args.pattern)?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&report));
    }

    println!(
        "{} Loaded '{}' ({} rows in {} tables)",
        "✓".green().bold(),
        args.pattern.cyan(),
        report.rows,
        report.tables.len()
    );
    for (plugin, table, rows) in &report.tables {
        println!("  {:12} {:24} {rows}", plugin.dimmed(), table);
    }
    if report.kept_values > 0 {
        println!(
            "{}",
            format!("Kept {} current site settings left blank in the pattern", report.kept_values)
                .dimmed()
        );
    }
    Ok(())
}
